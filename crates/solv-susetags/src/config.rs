//! Decode options, loadable from TOML.
//!
//! ```toml
//! vendor = "openSUSE"
//! with-attributes = true
//! pattern-namespace = "pattern"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SusetagsError};

/// Namespace prepended to pattern names and their dependencies.
pub const DEFAULT_PATTERN_NAMESPACE: &str = "pattern";

/// Options controlling a decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DecodeOptions {
    /// Vendor recorded on every created solvable.
    pub vendor: Option<String>,
    /// Whether descriptive attributes are decoded into an attribute store.
    pub with_attributes: bool,
    /// Namespace for `=Pat` records.
    pub pattern_namespace: String,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            vendor: None,
            with_attributes: true,
            pattern_namespace: DEFAULT_PATTERN_NAMESPACE.to_string(),
        }
    }
}

impl DecodeOptions {
    /// Parse options from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let options: DecodeOptions = toml::from_str(toml_str)?;
        Ok(options)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SusetagsError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn without_attributes(mut self) -> Self {
        self.with_attributes = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = DecodeOptions::default();
        assert!(options.with_attributes);
        assert!(options.vendor.is_none());
        assert_eq!(options.pattern_namespace, "pattern");
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(DecodeOptions::from_toml_str("").unwrap(), DecodeOptions::default());
    }

    #[test]
    fn parse_all_fields() {
        let options = DecodeOptions::from_toml_str(
            r#"
vendor = "openSUSE"
with-attributes = false
pattern-namespace = "product"
"#,
        )
        .unwrap();
        assert_eq!(options.vendor.as_deref(), Some("openSUSE"));
        assert!(!options.with_attributes);
        assert_eq!(options.pattern_namespace, "product");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = DecodeOptions::from_toml_str("verbose = true").unwrap_err();
        assert!(matches!(err, SusetagsError::Config(_)));
    }

    #[test]
    fn builder_helpers() {
        let options = DecodeOptions::default().with_vendor("SUSE").without_attributes();
        assert_eq!(options.vendor.as_deref(), Some("SUSE"));
        assert!(!options.with_attributes);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decode.toml");
        std::fs::write(&path, "vendor = \"Packman\"\n").unwrap();
        let options = DecodeOptions::load(&path).unwrap();
        assert_eq!(options.vendor.as_deref(), Some("Packman"));
        assert!(options.with_attributes);
    }

    #[test]
    fn load_not_found() {
        let result = DecodeOptions::load(Path::new("/nonexistent/decode.toml"));
        assert!(matches!(result.unwrap_err(), SusetagsError::NotFound { .. }));
    }
}
