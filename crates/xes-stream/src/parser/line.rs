//! Tokenizer for the one-element-per-line grammar.
//!
//! A line is split on `"`. Even slices hold element names and attribute
//! names, odd slices hold attribute values:
//!
//! ```text
//! <string key="concept:name" value="A" />
//! ["<string key=", "concept:name", " value=", "A", " />"]
//! ```

use crate::constants::TAG_LIST;

/// One tokenized input line.
#[derive(Debug, Clone)]
pub(crate) struct Line<'a> {
    raw: &'a str,
    content: Vec<&'a str>,
    tag: &'a str,
}

impl<'a> Line<'a> {
    pub(crate) fn new(raw: &'a str) -> Self {
        let content: Vec<&str> = raw.split('"').collect();
        let head = content.first().copied().unwrap_or_default();
        let tag = head.rsplit('<').next().unwrap_or(head);
        Self { raw, content, tag }
    }

    /// The line without surrounding whitespace.
    pub(crate) fn text(&self) -> &'a str {
        self.raw.trim()
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    pub(crate) fn slices(&self) -> &[&'a str] {
        &self.content
    }

    pub(crate) fn tag(&self) -> &'a str {
        self.tag
    }

    /// A `<type key="…" value="…" />` line.
    pub(crate) fn is_leaf(&self) -> bool {
        self.content.len() == 5
    }

    /// An element carrying exactly one attribute, e.g. `<list key="…">`.
    pub(crate) fn has_one_attribute(&self) -> bool {
        self.content.len() == 3
    }

    pub(crate) fn key(&self) -> &'a str {
        self.content.get(1).copied().unwrap_or_default()
    }

    pub(crate) fn value(&self) -> &'a str {
        self.content.get(3).copied().unwrap_or_default()
    }

    /// True for `<list key="…"/>`, which opens and closes on the same line.
    pub(crate) fn is_self_closing(&self) -> bool {
        self.content
            .get(2)
            .is_some_and(|rest| rest.trim_start().starts_with("/>"))
    }

    /// True for an attribute-less element closed on the same line, e.g. `<event/>`.
    pub(crate) fn is_empty_element(&self) -> bool {
        self.content.len() == 1 && self.tag.trim_end().ends_with("/>")
    }

    pub(crate) fn opens(&self, name: &str) -> bool {
        self.tag.starts_with(name)
    }

    pub(crate) fn closes(&self, name: &str) -> bool {
        self.tag
            .strip_prefix('/')
            .is_some_and(|rest| rest.starts_with(name))
    }

    /// A `<list key="KEY">` line, self-closing or not.
    pub(crate) fn opens_list(&self) -> bool {
        self.has_one_attribute() && self.opens(TAG_LIST)
    }

    /// A `<list key="KEY">` line with the given key.
    pub(crate) fn opens_list_with_key(&self, key: &str) -> bool {
        self.opens_list() && self.key() == key
    }

    pub(crate) fn closes_list(&self) -> bool {
        self.closes(TAG_LIST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_attribute() {
        let line = Line::new("\t\t<string key=\"concept:name\" value=\"A\" />");
        assert!(line.is_leaf());
        assert_eq!(line.tag(), "string key=");
        assert_eq!(line.key(), "concept:name");
        assert_eq!(line.value(), "A");
    }

    #[test]
    fn list_open_and_self_closing() {
        let open = Line::new("<list key=\"stream:point\">");
        assert!(open.opens_list_with_key("stream:point"));
        assert!(!open.is_self_closing());

        let empty = Line::new("\t<list key=\"stream:meta\" />");
        assert!(empty.opens_list_with_key("stream:meta"));
        assert!(empty.is_self_closing());

        let tight = Line::new("<list key=\"x\"/>");
        assert!(tight.is_self_closing());
    }

    #[test]
    fn closing_tags() {
        let line = Line::new("\t\t</list>");
        assert!(line.closes_list());
        assert!(!line.closes("trace"));
        assert_eq!(Line::new("</trace>").tag(), "/trace>");
        assert!(Line::new("</trace>").closes("trace"));
    }

    #[test]
    fn empty_elements() {
        assert!(Line::new("\t<event/>").is_empty_element());
        assert!(Line::new("<trace />").is_empty_element());
        assert!(!Line::new("<trace>").is_empty_element());
    }

    #[test]
    fn missing_slices_read_as_empty() {
        let line = Line::new("<trace>");
        assert_eq!(line.key(), "");
        assert_eq!(line.value(), "");
        assert!(Line::new("   ").is_blank());
    }
}
