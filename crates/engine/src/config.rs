//! Entity store configuration via `entitystore.toml`
//!
//! Holds the settings an [`EntityTable`](crate::EntityTable) is opened
//! with: the table name, the chunk size for buffer-typed properties, and
//! the transport retry policy. A missing file field falls back to its
//! default.

use serde::{Deserialize, Serialize};
use std::path::Path;

use entitystore_core::limits::validate_chunk_size;
use entitystore_core::{Error, Result, DEFAULT_CHUNK_SIZE};
use entitystore_storage::RetryConfig;

/// Conventional config file name
pub const CONFIG_FILE_NAME: &str = "entitystore.toml";

/// Transport retry settings, the `[retry]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrySettings {
    /// Maximum retries after the first attempt (default: 5)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// First backoff delay in milliseconds (default: 100)
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff ceiling in milliseconds (default: 5000)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_retries() -> usize {
    5
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    5_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig::new()
            .with_max_retries(settings.max_retries)
            .with_base_delay_ms(settings.base_delay_ms)
            .with_max_delay_ms(settings.max_delay_ms)
    }
}

/// Configuration loaded from `entitystore.toml`.
///
/// # Example
///
/// ```toml
/// table_name = "items"
/// max_chunk_size = 65536
///
/// [retry]
/// max_retries = 5
/// base_delay_ms = 100
/// max_delay_ms = 5000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityStoreConfig {
    /// Table the entities live in.
    #[serde(default = "default_table_name")]
    pub table_name: String,
    /// Largest chunk written for a buffer-typed property, `1..=65536`.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
    /// Transport retry policy.
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_table_name() -> String {
    "entities".to_string()
}

fn default_max_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for EntityStoreConfig {
    fn default() -> Self {
        Self {
            table_name: default_table_name(),
            max_chunk_size: default_max_chunk_size(),
            retry: RetrySettings::default(),
        }
    }
}

impl EntityStoreConfig {
    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `Config` if the table name is empty or not alphanumeric, the
    /// chunk size is out of range, or the base delay exceeds the maximum.
    pub fn validate(&self) -> Result<()> {
        if self.table_name.is_empty()
            || !self.table_name.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::Config(format!(
                "table name '{}' must be non-empty and alphanumeric",
                self.table_name
            )));
        }
        validate_chunk_size(self.max_chunk_size)?;
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(Error::Config(format!(
                "retry base_delay_ms {} exceeds max_delay_ms {}",
                self.retry.base_delay_ms, self.retry.max_delay_ms
            )));
        }
        Ok(())
    }

    /// Retry policy for the store wrapper
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::from(&self.retry)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Entity store configuration
#
# Table holding the entities (alphanumeric)
table_name = "entities"

# Largest chunk written for Text, JSON, Blob and SlugIdArray properties.
# Must not exceed the store's 65536 byte column limit.
max_chunk_size = 65536

# Retries for timeouts, throttling and server errors.
# Delay doubles from base_delay_ms up to max_delay_ms.
[retry]
max_retries = 5
base_delay_ms = 100
max_delay_ms = 5000
"#
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EntityStoreConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
