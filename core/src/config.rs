//! Engine configuration.
//!
//! ```toml
//! max_limit = 100
//! default_limit = 25
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{GraphError, Result};

/// Alias prefix for primary-key columns of each nesting level.
pub const KEY_PREFIX: &str = "__key";

/// Alias prefix for root cursor columns.
pub const CURSOR_PREFIX: &str = "__cursor";

/// Separator between field path segments and column alias segments.
pub const SEPARATOR: char = '.';

/// Page size cap used when none is configured.
pub const DEFAULT_MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// Upper bound applied to `first` and `last`.
    pub max_limit: u64,
    /// Page size when neither `first` nor `last` is supplied.
    pub default_limit: Option<u64>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_limit: DEFAULT_MAX_LIMIT,
            default_limit: None,
        }
    }
}

impl GraphConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GraphConfig = toml::from_str(text)?;
        config.validate()
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Effective page size for a request that gave no window.
    pub fn page_size(&self) -> u64 {
        self.default_limit
            .map_or(self.max_limit, |limit| limit.min(self.max_limit))
    }

    fn validate(self) -> Result<Self> {
        if self.max_limit == 0 {
            return Err(GraphError::Config("max_limit must be positive".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_to_missing_keys() {
        let config = GraphConfig::from_toml_str("default_limit = 10").unwrap();
        assert_eq!(config.max_limit, DEFAULT_MAX_LIMIT);
        assert_eq!(config.page_size(), 10);
    }

    #[test]
    fn default_limit_is_capped() {
        let config = GraphConfig::from_toml_str("max_limit = 5\ndefault_limit = 50").unwrap();
        assert_eq!(config.page_size(), 5);
    }

    #[test]
    fn rejects_unknown_keys_and_zero_cap() {
        assert!(matches!(
            GraphConfig::from_toml_str("page = 3"),
            Err(GraphError::Config(_))
        ));
        assert!(matches!(
            GraphConfig::from_toml_str("max_limit = 0"),
            Err(GraphError::Config(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_limit = 20").unwrap();

        let config = GraphConfig::load(file.path()).unwrap();
        assert_eq!(config.max_limit, 20);
        assert_eq!(config.page_size(), 20);
    }
}
