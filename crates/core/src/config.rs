use crate::error::{ContextError, Result};
use scopechain_api::Value;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings shared by every context in a chain.
///
/// Roots take a config explicitly; every other context inherits its
/// parent's at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Treat a stored null as undefined when reading. Assignment lookups
    /// still see the key so writes land where it already lives.
    pub null_is_undefined: bool,
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub log_level: String,
    /// Directory for rolling log files; `$HOME/.scopechain/logs` when unset.
    pub log_dir: Option<PathBuf>,
    pub log_to_stderr: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            null_is_undefined: false,
            log_level: "info".to_string(),
            log_dir: None,
            log_to_stderr: false,
        }
    }
}

impl ResolverConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ResolverConfig = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!("Loaded resolver config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            return Err(ContextError::Config("log_level must not be empty".to_string()));
        }
        Ok(())
    }

    /// Whether a raw scope value counts as bound for this lookup.
    pub fn is_defined(&self, value: &Value, for_assign: bool) -> bool {
        for_assign || !self.null_is_undefined || !value.is_null()
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            Path::new(&home).join(".scopechain/logs")
        })
    }
}
