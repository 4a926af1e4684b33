//! Typed attribute coercion and the stack of open nested lists.

use tracing::trace;

use super::line::Line;
use super::ParseState;
use crate::constants::NOT_SPECIFIED;
use crate::error::{Expectation, Result, XesError};
use crate::model::{Attribute, AttributeType, AttributeValue};
use crate::traits::TimestampParser;

/// Reads a leaf line into a typed attribute.
///
/// The type comes from the element name; `__NOTSPECIFIED__` overrides it.
pub(crate) fn read_attribute<P: TimestampParser>(
    line: &Line<'_>,
    timestamps: &P,
    context: &'static str,
) -> Result<Attribute> {
    let key = line.key();
    let text = line.value();
    let invalid = || XesError::InvalidAttribute {
        context,
        key: key.to_string(),
        value: text.to_string(),
    };

    let value = if text == NOT_SPECIFIED {
        AttributeValue::NotSpecified
    } else {
        match AttributeType::from_tag(line.tag()) {
            AttributeType::Date => {
                AttributeValue::Date(timestamps.parse_timestamp(text).ok_or_else(invalid)?)
            }
            AttributeType::Int => AttributeValue::Int(text.trim().parse().map_err(|_| invalid())?),
            AttributeType::Float => {
                AttributeValue::Float(text.trim().parse().map_err(|_| invalid())?)
            }
            AttributeType::Boolean => AttributeValue::Boolean(text == "true"),
            AttributeType::String | AttributeType::List => AttributeValue::String(text.to_string()),
        }
    };

    Ok(Attribute {
        key: key.to_string(),
        value,
    })
}

#[derive(Debug)]
struct Frame {
    key: String,
    items: Vec<Attribute>,
}

/// Open nested attribute lists, innermost last.
#[derive(Debug, Default)]
pub(crate) struct AttributeStack {
    frames: Vec<Frame>,
}

impl AttributeStack {
    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Opens the outermost list of a nested attribute.
    pub(crate) fn open_root(&mut self, key: impl Into<String>) -> Result<()> {
        if !self.frames.is_empty() {
            return Err(XesError::PreconditionViolated {
                subject: "nested attribute stack",
                expectation: Expectation::ShouldBeEmpty,
            });
        }
        self.frames.push(Frame {
            key: key.into(),
            items: Vec::new(),
        });
        Ok(())
    }

    /// Consumes one line inside an open list.
    ///
    /// Returns the outermost list once its closing line is read.
    pub(crate) fn feed<P: TimestampParser>(
        &mut self,
        line: &Line<'_>,
        timestamps: &P,
    ) -> Result<Option<Attribute>> {
        let Some(top) = self.frames.last_mut() else {
            return Err(XesError::PreconditionViolated {
                subject: "nested attribute stack",
                expectation: Expectation::ShouldNotBeEmpty,
            });
        };

        if line.is_leaf() {
            top.items.push(read_attribute(line, timestamps, "nested attribute")?);
        } else if line.opens_list() {
            if line.is_self_closing() {
                top.items
                    .push(Attribute::new(line.key(), AttributeValue::List(Vec::new())));
            } else {
                trace!(key = line.key(), depth = self.frames.len() + 1, "nested list opened");
                self.frames.push(Frame {
                    key: line.key().to_string(),
                    items: Vec::new(),
                });
            }
        } else if line.closes_list() {
            if let Some(closed) = self.frames.pop() {
                let attribute = Attribute::new(closed.key, AttributeValue::List(closed.items));
                match self.frames.last_mut() {
                    Some(parent) => parent.items.push(attribute),
                    None => return Ok(Some(attribute)),
                }
            }
        } else {
            return Err(XesError::UnexpectedState {
                state: ParseState::Attribute,
                content: line.text().to_string(),
            });
        }
        Ok(None)
    }
}
