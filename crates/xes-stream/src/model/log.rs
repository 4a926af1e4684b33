//! The document root and its log-level declarations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AttributeValue, Attributes, Element, Trace};

/// A registered XES extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Extension name, e.g. `Concept`.
    pub name: String,
    /// Key prefix, e.g. `concept`.
    pub prefix: String,
    /// Definition URI.
    pub uri: String,
}

impl Extension {
    /// Creates a new extension declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }
}

/// A named event classifier over a set of attribute keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    /// Classifier name.
    pub name: String,
    /// Attribute keys, in declaration order.
    pub keys: Vec<String>,
    /// Declared `scope`; absent means the classifier applies to events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

/// Target of a global default-attribute declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Defaults for every trace.
    Trace,
    /// Defaults for every event.
    Event,
}

impl Scope {
    /// Returns the name written in the `scope` attribute.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Event => "event",
        }
    }

    /// Parses a `scope` attribute value.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "trace" => Some(Self::Trace),
            "event" => Some(Self::Event),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default attributes declared for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalScope {
    /// The scope the defaults apply to.
    pub scope: Scope,
    /// The default attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

/// A whole XES document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Log {
    /// Value of `xes.version`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Value of `xes.features`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<String>,
    /// Log-level attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Registered extensions, in declaration order.
    #[serde(default)]
    pub extensions: Vec<Extension>,
    /// Global default attributes, one entry per declared scope.
    #[serde(default)]
    pub globals: Vec<GlobalScope>,
    /// Classifier definitions.
    #[serde(default)]
    pub classifiers: Vec<Classifier>,
    /// Traces and top-level events, in document order.
    #[serde(default)]
    pub children: Vec<Element>,
}

impl Log {
    /// Creates an empty log with no version or features.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `xes.version`.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets `xes.features`.
    #[must_use]
    pub fn with_features(mut self, features: impl Into<String>) -> Self {
        self.features = Some(features.into());
        self
    }

    /// Appends a child.
    pub fn push(&mut self, child: impl Into<Element>) {
        self.children.push(child.into());
    }

    /// Returns the number of top-level children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if the log has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the child at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Element> {
        self.children.get(index)
    }

    /// Iterates over the top-level children.
    pub fn iter(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }

    /// Iterates over the top-level traces.
    pub fn traces(&self) -> impl Iterator<Item = &Trace> {
        self.children.iter().filter_map(Element::as_trace)
    }

    /// Registers an extension, replacing one with the same name.
    pub fn set_extension(&mut self, extension: Extension) {
        match self.extensions.iter_mut().find(|e| e.name == extension.name) {
            Some(existing) => *existing = extension,
            None => self.extensions.push(extension),
        }
    }

    /// Returns the defaults of `scope`, registering the scope if needed.
    pub fn global_scope_mut(&mut self, scope: Scope) -> &mut Attributes {
        let index = match self.globals.iter().position(|g| g.scope == scope) {
            Some(index) => index,
            None => {
                self.globals.push(GlobalScope {
                    scope,
                    attributes: Attributes::new(),
                });
                self.globals.len() - 1
            }
        };
        &mut self.globals[index].attributes
    }

    /// Returns the defaults of `scope`, if declared.
    #[must_use]
    pub fn global_scope(&self, scope: Scope) -> Option<&Attributes> {
        self.globals
            .iter()
            .find(|g| g.scope == scope)
            .map(|g| &g.attributes)
    }

    /// Sets one default attribute of `scope`.
    pub fn set_global_attribute(
        &mut self,
        scope: Scope,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.global_scope_mut(scope).set(key, value)
    }
}

impl<'a> IntoIterator for &'a Log {
    type Item = &'a Element;
    type IntoIter = std::slice::Iter<'a, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}
