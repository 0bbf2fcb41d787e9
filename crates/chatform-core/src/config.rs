//! Wizard configuration
//!
//! Timer delays and an optional catalog override, loadable from TOML.

use crate::error::ConfigError;
use chatform_catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Wizard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Delay between consecutive closing statements, in milliseconds
    pub chain_delay_ms: u64,
    /// Delay between the host closing the wizard and the session reset,
    /// matching the host's closing transition, in milliseconds
    pub close_reset_delay_ms: u64,
    /// YAML catalog to use instead of the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl WizardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// `ConfigError::Toml` on malformed input
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    ///
    /// A relative `catalog_path` is resolved against the file's directory.
    ///
    /// # Errors
    /// `ConfigError::Io` or `ConfigError::Toml`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&source)?;
        config.catalog_path = config.catalog_path.take().map(|catalog| match path.parent() {
            Some(dir) if catalog.is_relative() => dir.join(catalog),
            _ => catalog,
        });
        Ok(config)
    }

    /// With chain delay
    #[inline]
    #[must_use]
    pub fn with_chain_delay(mut self, delay: Duration) -> Self {
        self.chain_delay_ms = duration_ms(delay);
        self
    }

    /// With close-reset delay
    #[inline]
    #[must_use]
    pub fn with_close_reset_delay(mut self, delay: Duration) -> Self {
        self.close_reset_delay_ms = duration_ms(delay);
        self
    }

    /// With catalog file
    #[inline]
    #[must_use]
    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Chain delay as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn chain_delay(&self) -> Duration {
        Duration::from_millis(self.chain_delay_ms)
    }

    /// Close-reset delay as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn close_reset_delay(&self) -> Duration {
        Duration::from_millis(self.close_reset_delay_ms)
    }

    /// Configured catalog, or the built-in one
    ///
    /// # Errors
    /// `ConfigError::Catalog` if the configured file cannot be loaded
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        match &self.catalog_path {
            Some(path) => Ok(Catalog::load(path)?),
            None => Ok(Catalog::standard()),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            chain_delay_ms: 2_000,
            close_reset_delay_ms: 600,
            catalog_path: None,
        }
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatform_catalog::Sequence;

    #[test]
    fn defaults() {
        let config = WizardConfig::new();
        assert_eq!(config.chain_delay(), Duration::from_secs(2));
        assert_eq!(config.close_reset_delay(), Duration::from_millis(600));
        assert_eq!(config.catalog().unwrap(), Catalog::standard());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = WizardConfig::from_toml_str("chain_delay_ms = 50").unwrap();
        assert_eq!(config.chain_delay(), Duration::from_millis(50));
        assert_eq!(config.close_reset_delay_ms, 600);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            WizardConfig::from_toml_str("chain_delay_ms = \"soon\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn builder() {
        let config = WizardConfig::new()
            .with_chain_delay(Duration::from_millis(10))
            .with_close_reset_delay(Duration::from_millis(20));
        assert_eq!(config.chain_delay_ms, 10);
        assert_eq!(config.close_reset_delay_ms, 20);
    }

    #[test]
    fn load_resolves_relative_catalog_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = Catalog::standard();
        catalog.other.insert(
            0,
            chatform_catalog::PromptedQuestion::new("topic", "Topic?").into(),
        );
        std::fs::write(dir.path().join("catalog.yaml"), catalog.to_yaml().unwrap()).unwrap();
        std::fs::write(
            dir.path().join("wizard.toml"),
            "chain_delay_ms = 5\ncatalog_path = \"catalog.yaml\"\n",
        )
        .unwrap();

        let config = WizardConfig::load(dir.path().join("wizard.toml")).unwrap();
        assert_eq!(config.catalog_path, Some(dir.path().join("catalog.yaml")));
        let loaded = config.catalog().unwrap();
        assert_eq!(loaded.sequence(Sequence::Other).len(), 3);
    }

    #[test]
    fn missing_catalog_file_is_a_catalog_error() {
        let config = WizardConfig::new().with_catalog_path("/nonexistent/catalog.yaml");
        assert!(matches!(config.catalog(), Err(ConfigError::Catalog(_))));
    }
}
