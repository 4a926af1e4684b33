//! Import and export settings.

use std::path::Path;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_ENCODING;
use crate::error::{Result, XesError};
use crate::filter::SourceMatching;

/// Settings shared by the importer, the exporter and the query helpers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XesConfig {
    /// Run the verifier after import and before export.
    pub apply_verifier: bool,
    /// Text encoding label, resolved through the WHATWG registry.
    pub encoding: String,
    /// Emit `info` events while exporting.
    pub show_progress: bool,
    /// How multipoint sources are compared by the merge helpers.
    pub source_matching: SourceMatching,
}

impl Default for XesConfig {
    fn default() -> Self {
        Self {
            apply_verifier: true,
            encoding: DEFAULT_ENCODING.to_string(),
            show_progress: false,
            source_matching: SourceMatching::default(),
        }
    }
}

impl XesConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables verification.
    #[must_use]
    pub fn with_verifier(mut self, apply: bool) -> Self {
        self.apply_verifier = apply;
        self
    }

    /// Sets the encoding label.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Enables or disables export progress events.
    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Sets the source matching rule.
    #[must_use]
    pub fn with_source_matching(mut self, matching: SourceMatching) -> Self {
        self.source_matching = matching;
        self
    }

    /// Parses a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Resolves the encoding label.
    ///
    /// # Errors
    ///
    /// Returns [`XesError::UnsupportedEncoding`] for unknown labels and for
    /// encodings that are not ASCII-compatible, since lines are split on
    /// single `\n` and `"` bytes.
    pub fn resolve_encoding(&self) -> Result<&'static Encoding> {
        let encoding = Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| XesError::UnsupportedEncoding(self.encoding.clone()))?;
        if !encoding.is_ascii_compatible() {
            return Err(XesError::UnsupportedEncoding(self.encoding.clone()));
        }
        Ok(encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn defaults() {
        let config = XesConfig::default();
        assert!(config.apply_verifier);
        assert_eq!(config.encoding, "utf-8");
        assert!(!config.show_progress);
        assert_eq!(config.source_matching, SourceMatching::SameField);
    }

    #[test]
    fn builder_chain() {
        let config = XesConfig::new()
            .with_verifier(false)
            .with_encoding("latin1")
            .with_progress(true)
            .with_source_matching(SourceMatching::Legacy);
        assert!(!config.apply_verifier);
        assert!(config.show_progress);
        assert_eq!(config.source_matching, SourceMatching::Legacy);
        assert_eq!(config.resolve_encoding().expect("known label").name(), "windows-1252");
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = XesConfig::from_json_str(r#"{"apply_verifier": false, "source_matching": "legacy"}"#)
            .expect("valid json");
        assert!(!config.apply_verifier);
        assert_eq!(config.encoding, "utf-8");
        assert_eq!(config.source_matching, SourceMatching::Legacy);
    }

    #[test]
    fn json_errors_are_config_errors() {
        let err = XesConfig::from_json_str("{not json").expect_err("invalid json");
        assert!(matches!(err, XesError::Config(_)));
    }

    #[test]
    fn json_file_roundtrip() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("xes.json");
        let config = XesConfig::new().with_encoding("iso-8859-15");
        std::fs::write(&path, serde_json::to_string(&config).expect("serialize")).expect("write");
        assert_eq!(XesConfig::from_json_file(&path).expect("load"), config);
    }

    #[test_case("utf-8", "UTF-8" ; "utf8")]
    #[test_case(" UTF8 ", "UTF-8" ; "case and whitespace")]
    #[test_case("iso-8859-1", "windows-1252" ; "latin1 alias")]
    #[test_case("shift_jis", "Shift_JIS" ; "shift jis")]
    fn known_encodings(label: &str, name: &str) {
        let config = XesConfig::new().with_encoding(label);
        assert_eq!(config.resolve_encoding().expect("supported").name(), name);
    }

    #[test_case("utf-16le" ; "utf16")]
    #[test_case("klingon" ; "unknown")]
    fn unsupported_encodings(label: &str) {
        let err = XesConfig::new().with_encoding(label).resolve_encoding().expect_err("unsupported");
        assert!(matches!(err, XesError::UnsupportedEncoding(_)));
    }
}
