use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::symbol::{DecodeHints, SymbolConfig};

/// Settings shared by both pipelines.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
///
/// # Examples
/// ```
/// use qrferry_core::CodecConfig;
///
/// let config: CodecConfig = serde_json::from_str(r#"{"parallel": true}"#)?;
/// assert!(config.parallel);
/// assert_eq!(config.symbol.version, 40);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Rendering parameters for the encoder.
    pub symbol: SymbolConfig,
    /// Recognition hints for the decoder.
    pub hints: DecodeHints,
    /// Process symbols on a worker pool instead of one at a time.
    pub parallel: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `ConfigError` when the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
