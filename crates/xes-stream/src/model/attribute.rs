//! Typed attribute values and insertion-ordered attribute maps.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::constants::{
    NOT_SPECIFIED, TAG_BOOLEAN, TAG_DATE, TAG_FLOAT, TAG_INT, TAG_LIST, TAG_STRING,
};
use crate::error::{Result, XesError};

/// The XES type tag an attribute is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// `<string …/>`
    String,
    /// `<date …/>`
    Date,
    /// `<int …/>`
    Int,
    /// `<float …/>`
    Float,
    /// `<boolean …/>`
    Boolean,
    /// `<list …>`
    List,
}

impl AttributeType {
    /// Returns the tag name of this type.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::String => TAG_STRING,
            Self::Date => TAG_DATE,
            Self::Int => TAG_INT,
            Self::Float => TAG_FLOAT,
            Self::Boolean => TAG_BOOLEAN,
            Self::List => TAG_LIST,
        }
    }

    /// Classifies an element name by prefix; unknown names read as strings.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        [
            Self::String,
            Self::Date,
            Self::Int,
            Self::Float,
            Self::Boolean,
            Self::List,
        ]
        .into_iter()
        .find(|kind| tag.starts_with(kind.tag()))
        .unwrap_or(Self::String)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    /// Free text.
    String(String),
    /// An instant with its original UTC offset.
    Date(DateTime<FixedOffset>),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A boolean flag.
    Boolean(bool),
    /// An ordered list of keyed entries; keys may repeat.
    List(Vec<Attribute>),
    /// The `__NOTSPECIFIED__` sentinel.
    NotSpecified,
}

/// A keyed attribute value, the unit of nested lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute key.
    pub key: String,
    /// The attribute value.
    pub value: AttributeValue,
}

impl Attribute {
    /// Creates a new attribute.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl AttributeValue {
    /// Returns the tag this value is written with.
    #[must_use]
    pub const fn attribute_type(&self) -> AttributeType {
        match self {
            Self::String(_) | Self::NotSpecified => AttributeType::String,
            Self::Date(_) => AttributeType::Date,
            Self::Int(_) => AttributeType::Int,
            Self::Float(_) => AttributeType::Float,
            Self::Boolean(_) => AttributeType::Boolean,
            Self::List(_) => AttributeType::List,
        }
    }

    /// Returns the text written in the `value` slot, `None` for lists.
    #[must_use]
    pub fn to_xes_text(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Date(d) => Some(d.to_rfc3339_opts(SecondsFormat::AutoSi, false)),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(format!("{f:?}")),
            Self::Boolean(b) => Some(b.to_string()),
            Self::NotSpecified => Some(NOT_SPECIFIED.to_string()),
            Self::List(_) => None,
        }
    }

    /// Returns the string content if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list entries if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Attribute]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Unwraps a list value, failing with the shape found otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`XesError::UnexpectedAttributeShape`] for non-list values.
    pub fn into_list(self, context: &'static str) -> Result<Vec<Attribute>> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(XesError::UnexpectedAttributeShape {
                context,
                found: other.to_string(),
            }),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::NotSpecified => 0,
            Self::Boolean(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Date(_) => 3,
            Self::String(_) => 4,
            Self::List(_) => 5,
        }
    }

    /// Total order used when sorting readings.
    ///
    /// Values of different kinds order as not-specified, booleans, numbers,
    /// dates, strings, lists. Integers and floats compare numerically with
    /// integers first on ties.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => {
                for (left, right) in a.iter().zip(b) {
                    let ord = left
                        .key
                        .cmp(&right.key)
                        .then_with(|| left.value.total_cmp(&right.value));
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", item.key, item.value)?;
                }
                f.write_str("]")
            }
            other => f.write_str(&other.to_xes_text().unwrap_or_default()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<FixedOffset>> for AttributeValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<Attribute>> for AttributeValue {
    fn from(value: Vec<Attribute>) -> Self {
        Self::List(value)
    }
}

/// Insertion-ordered attribute map with unique keys.
///
/// Equality ignores insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    /// Inserts a new entry, rejecting keys that are already present.
    ///
    /// # Errors
    ///
    /// Returns [`XesError::DuplicateAttribute`] if the key exists.
    pub fn insert(
        &mut self,
        context: &'static str,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        let key = key.into();
        if self.contains_key(&key) {
            return Err(XesError::DuplicateAttribute { context, key });
        }
        self.entries.push(Attribute {
            key,
            value: value.into(),
        });
        Ok(())
    }

    /// Inserts or replaces an entry, returning the previous value.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                self.entries.push(Attribute { key, value });
                None
            }
        }
    }

    /// Removes an entry by key.
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        let position = self.entries.iter().position(|entry| entry.key == key)?;
        Some(self.entries.remove(position).value)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|entry| other.get(&entry.key) == Some(&entry.value))
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("string key=", AttributeType::String ; "string")]
    #[test_case("date key=", AttributeType::Date ; "date")]
    #[test_case("int key=", AttributeType::Int ; "int")]
    #[test_case("float key=", AttributeType::Float ; "float")]
    #[test_case("boolean key=", AttributeType::Boolean ; "boolean")]
    #[test_case("list key=", AttributeType::List ; "list")]
    #[test_case("id key=", AttributeType::String ; "unknown defaults to string")]
    fn attribute_type_from_tag(tag: &str, expected: AttributeType) {
        assert_eq!(AttributeType::from_tag(tag), expected);
    }

    #[test]
    fn xes_text_of_scalars() {
        assert_eq!(AttributeValue::from(42).to_xes_text().as_deref(), Some("42"));
        assert_eq!(AttributeValue::from(1.0).to_xes_text().as_deref(), Some("1.0"));
        assert_eq!(AttributeValue::from(true).to_xes_text().as_deref(), Some("true"));
        assert_eq!(
            AttributeValue::NotSpecified.to_xes_text().as_deref(),
            Some(NOT_SPECIFIED)
        );
        assert!(AttributeValue::List(Vec::new()).to_xes_text().is_none());
    }

    #[test]
    fn date_text_keeps_offset() {
        let date = DateTime::parse_from_rfc3339("2023-04-28T17:18:20.0747454+02:00")
            .expect("valid date");
        let text = AttributeValue::from(date).to_xes_text().expect("scalar");
        assert_eq!(text, "2023-04-28T17:18:20.074745400+02:00");
        let reparsed = DateTime::parse_from_rfc3339(&text).expect("reparse");
        assert_eq!(reparsed, date);
    }

    #[test]
    fn float_text_reparses_exactly() {
        for value in [0.1, 1e-7, 123_456.789, -2.5] {
            let text = AttributeValue::Float(value).to_xes_text().expect("scalar");
            assert_eq!(text.parse::<f64>().ok(), Some(value));
        }
    }

    #[test]
    fn total_cmp_orders_kinds_then_values() {
        let mut values = vec![
            AttributeValue::from("b"),
            AttributeValue::from(2.5),
            AttributeValue::from("a"),
            AttributeValue::from(2),
            AttributeValue::NotSpecified,
            AttributeValue::from(false),
        ];
        values.sort_by(AttributeValue::total_cmp);
        assert_eq!(
            values,
            vec![
                AttributeValue::NotSpecified,
                AttributeValue::from(false),
                AttributeValue::from(2),
                AttributeValue::from(2.5),
                AttributeValue::from("a"),
                AttributeValue::from("b"),
            ]
        );
    }

    #[test]
    fn into_list_rejects_scalars() {
        let err = AttributeValue::from("x").into_list("point").expect_err("scalar");
        assert!(matches!(err, XesError::UnexpectedAttributeShape { context: "point", .. }));
    }

    #[test]
    fn attributes_insert_rejects_duplicates() {
        let mut attrs = Attributes::new();
        assert!(attrs.insert("trace", "concept:name", "a").is_ok());
        let err = attrs.insert("trace", "concept:name", "b").expect_err("duplicate");
        assert!(matches!(err, XesError::DuplicateAttribute { .. }));
        assert_eq!(attrs.get("concept:name"), Some(&AttributeValue::from("a")));
    }

    #[test]
    fn attributes_set_replaces_in_place() {
        let mut attrs = Attributes::new();
        attrs.set("a", 1);
        attrs.set("b", 2);
        assert_eq!(attrs.set("a", 3), Some(AttributeValue::Int(1)));
        let keys: Vec<_> = attrs.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(attrs.remove("a"), Some(AttributeValue::Int(3)));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn attributes_equality_ignores_order() {
        let mut left = Attributes::new();
        left.set("a", 1);
        left.set("b", "x");
        let mut right = Attributes::new();
        right.set("b", "x");
        right.set("a", 1);
        assert_eq!(left, right);

        right.set("a", 2);
        assert_ne!(left, right);
    }

    #[test]
    fn display_renders_nested_lists() {
        let value = AttributeValue::List(vec![
            Attribute::new("type", "System.String"),
            Attribute::new("inner", AttributeValue::List(vec![Attribute::new("n", 1)])),
        ]);
        assert_eq!(value.to_string(), "[type=System.String, inner=[n=1]]");
    }
}
