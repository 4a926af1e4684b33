//! Error types for reading, verifying and writing XES documents.

use std::fmt;

use thiserror::Error;

use crate::parser::ParseState;

/// What an internal cursor or stack was expected to look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// The stack should have been empty.
    ShouldBeEmpty,
    /// The stack should have held at least one entry.
    ShouldNotBeEmpty,
    /// The cursor should have been set.
    ShouldBeSet,
    /// The cursor should not have been set.
    ShouldNotBeSet,
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ShouldBeEmpty => "should be empty",
            Self::ShouldNotBeEmpty => "should not be empty",
            Self::ShouldBeSet => "should be set",
            Self::ShouldNotBeSet => "should not be set",
        };
        f.write_str(text)
    }
}

/// Errors that can occur while handling XES documents.
#[derive(Debug, Error)]
pub enum XesError {
    /// A line could not be classified by the active state handler.
    #[error("unexpected line in {state} state: {content:?}")]
    UnexpectedState {
        /// The state that rejected the line.
        state: ParseState,
        /// The offending line.
        content: String,
    },

    /// A nested attribute value had a shape other than the one required.
    #[error("{context}: unexpected attribute shape, found {found}")]
    UnexpectedAttributeShape {
        /// Where the value was being stored.
        context: &'static str,
        /// Rendering of the rejected value.
        found: String,
    },

    /// A tag, key and value combination violates the grammar.
    #[error("{context}: attribute with key={key} and value={value} not supported")]
    InvalidAttribute {
        /// Where the attribute was found.
        context: &'static str,
        /// The attribute key.
        key: String,
        /// The attribute value as written.
        value: String,
    },

    /// The same key was inserted twice into an attribute map.
    #[error("{context}: attribute with key={key} is already present")]
    DuplicateAttribute {
        /// The owner of the attribute map.
        context: &'static str,
        /// The repeated key.
        key: String,
    },

    /// A parser cursor or stack was in the wrong state for a transition.
    #[error("expected {subject} {expectation}")]
    PreconditionViolated {
        /// The cursor or stack that was checked.
        subject: &'static str,
        /// What it should have looked like.
        expectation: Expectation,
    },

    /// More than one top-level log was found in one input.
    #[error("unexpected to have multiple logs in one document")]
    MultipleRootDocuments,

    /// An element kind was found in a position that has no handler.
    #[error("unsupported {kind} element in {context}")]
    UnsupportedEntityType {
        /// The kind of the element.
        kind: &'static str,
        /// The position it was found in.
        context: &'static str,
    },

    /// A containment or cardinality invariant does not hold.
    #[error("{entity} verification failed: {reason}")]
    VerificationFailed {
        /// The entity that failed.
        entity: &'static str,
        /// Why it failed.
        reason: String,
    },

    /// The configured text encoding is unknown or not line-splittable.
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parse failure annotated with the 1-based line it happened on.
    #[error("line {line}: {source}")]
    AtLine {
        /// Line number of the failure.
        line: usize,
        /// The underlying failure.
        #[source]
        source: Box<XesError>,
    },
}

impl XesError {
    /// Returns the error with any line annotation stripped.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the line number the error was raised on, if known.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            already @ Self::AtLine { .. } => already,
            other => Self::AtLine {
                line,
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias for XES operations.
pub type Result<T> = std::result::Result<T, XesError>;
