use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use qrcode::Version;
use qrcode::bits::Bits;
use qrcode::types::Mode;
use serde::{Deserialize, Serialize};

use super::error::SymbolError;
use crate::payload::MAX_CHUNK;

/// Highest QR version (177x177 modules).
pub const MAX_VERSION: u8 = 40;
/// Upper bound for the pixel size of one module.
pub const MAX_MODULE_SIZE: u32 = 64;
/// Upper bound for the quiet-zone border, in modules.
pub const MAX_BORDER: u32 = 32;

/// QR error-correction level, trading payload capacity for damage tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EcLevel {
    /// About 7% of codewords recoverable.
    #[default]
    L,
    /// About 15%.
    M,
    /// About 25%.
    Q,
    /// About 30%.
    H,
}

impl EcLevel {
    /// Largest chunk, in characters, that fits one version-40 symbol.
    ///
    /// Byte-mode capacity at version 40 less a 16-character margin, which
    /// gives [`MAX_CHUNK`] for level L.
    pub const fn default_chunk(self) -> usize {
        match self {
            EcLevel::L => MAX_CHUNK,
            EcLevel::M => 2315,
            EcLevel::Q => 1647,
            EcLevel::H => 1257,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(label)
    }
}

impl FromStr for EcLevel {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(EcLevel::L),
            "m" | "medium" => Ok(EcLevel::M),
            "q" | "quartile" => Ok(EcLevel::Q),
            "h" | "high" => Ok(EcLevel::H),
            _ => Err(SymbolError::UnknownEcLevel(s.to_string())),
        }
    }
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

/// Rendering parameters shared by every symbol of one run.
///
/// # Examples
/// ```
/// use qrferry_core::symbol::{EcLevel, SymbolConfig};
///
/// let config = SymbolConfig::default();
/// assert_eq!(config.version, 40);
/// assert_eq!(config.ec_level, EcLevel::L);
/// assert_eq!(config.chunk_limit().get(), 2937);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    /// QR version (1..=40); fixed for the whole run.
    pub version: u8,
    /// Error-correction level.
    pub ec_level: EcLevel,
    /// Pixel width and height of one module.
    pub module_size: u32,
    /// Quiet-zone width, in modules.
    pub border: u32,
    /// Chunk limit override; defaults to [`SymbolConfig::capacity`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chunk: Option<NonZeroUsize>,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            version: MAX_VERSION,
            ec_level: EcLevel::L,
            module_size: 10,
            border: 4,
            max_chunk: None,
        }
    }
}

impl SymbolConfig {
    /// Largest chunk one symbol of this version and level can carry.
    ///
    /// Byte-mode capacity of the configured version, capped at the level's
    /// [`EcLevel::default_chunk`]. Zero for a version outside `1..=40`.
    pub fn capacity(&self) -> usize {
        byte_capacity(self.version, self.ec_level).min(self.ec_level.default_chunk())
    }

    /// Characters of encoded text carried by each symbol.
    pub fn chunk_limit(&self) -> NonZeroUsize {
        self.max_chunk
            .unwrap_or_else(|| NonZeroUsize::new(self.capacity()).unwrap_or(NonZeroUsize::MIN))
    }

    /// Check ranges before any symbol is rendered.
    ///
    /// # Errors
    /// Returns `SymbolError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<(), SymbolError> {
        if !(1..=MAX_VERSION).contains(&self.version) {
            return Err(SymbolError::InvalidConfig(format!(
                "version must be within 1..={MAX_VERSION}, got {}",
                self.version
            )));
        }
        if !(1..=MAX_MODULE_SIZE).contains(&self.module_size) {
            return Err(SymbolError::InvalidConfig(format!(
                "module size must be within 1..={MAX_MODULE_SIZE}, got {}",
                self.module_size
            )));
        }
        if self.border > MAX_BORDER {
            return Err(SymbolError::InvalidConfig(format!(
                "border must be at most {MAX_BORDER}, got {}",
                self.border
            )));
        }
        if let Some(max_chunk) = self.max_chunk {
            let capacity = self.capacity();
            if max_chunk.get() > capacity {
                return Err(SymbolError::InvalidConfig(format!(
                    "chunk limit {} exceeds the version {} level {} capacity of {capacity}",
                    max_chunk, self.version, self.ec_level
                )));
            }
        }
        Ok(())
    }
}

/// Bytes a byte-mode segment can hold in one symbol of `version` at `level`.
fn byte_capacity(version: u8, level: EcLevel) -> usize {
    let version = Version::Normal(i16::from(version));
    let Ok(data_bits) = Bits::new(version).max_len(level.into()) else {
        return 0;
    };
    // Mode indicator plus the character-count field.
    let header_bits = 4 + Mode::Byte.length_bits_count(version);
    data_bits.saturating_sub(header_bits) / 8
}

/// Recognition hints for the symbol decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeHints {
    /// Retry with an added quiet zone and with inverted intensities.
    pub try_harder: bool,
    /// The frame holds exactly one undecorated symbol.
    pub pure_barcode: bool,
}

impl Default for DecodeHints {
    fn default() -> Self {
        Self {
            try_harder: true,
            pure_barcode: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::{DecodeHints, EcLevel, SymbolConfig};
    use crate::symbol::SymbolError;

    #[test]
    fn default_chunk_shrinks_with_stronger_correction() {
        let levels = [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H];
        let limits: Vec<_> = levels.iter().map(|l| l.default_chunk()).collect();
        assert_eq!(limits, [2937, 2315, 1647, 1257]);
    }

    #[test]
    fn parses_short_and_long_level_names() {
        assert_eq!("l".parse::<EcLevel>().unwrap(), EcLevel::L);
        assert_eq!("Medium".parse::<EcLevel>().unwrap(), EcLevel::M);
        assert_eq!("Q".parse::<EcLevel>().unwrap(), EcLevel::Q);
        assert_eq!("high".parse::<EcLevel>().unwrap(), EcLevel::H);
        let err = "x".parse::<EcLevel>().unwrap_err();
        assert!(matches!(err, SymbolError::UnknownEcLevel(_)));
    }

    #[test]
    fn chunk_limit_follows_level_unless_overridden() {
        let mut config = SymbolConfig {
            ec_level: EcLevel::H,
            ..SymbolConfig::default()
        };
        assert_eq!(config.chunk_limit().get(), 1257);
        config.max_chunk = NonZeroUsize::new(100);
        assert_eq!(config.chunk_limit().get(), 100);
    }

    #[test]
    fn capacity_follows_version() {
        let small = SymbolConfig {
            version: 10,
            ..SymbolConfig::default()
        };
        assert_eq!(small.capacity(), 271);
        assert_eq!(small.chunk_limit().get(), 271);

        let tiny = SymbolConfig {
            version: 1,
            ec_level: EcLevel::H,
            ..SymbolConfig::default()
        };
        assert_eq!(tiny.capacity(), 7);

        for level in [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H] {
            let full = SymbolConfig {
                ec_level: level,
                ..SymbolConfig::default()
            };
            assert_eq!(full.capacity(), level.default_chunk());
        }
    }

    #[test]
    fn chunk_override_must_fit_the_configured_version() {
        let config = SymbolConfig {
            version: 10,
            max_chunk: NonZeroUsize::new(300),
            ..SymbolConfig::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("exceeds the version 10 level L capacity of 271"));

        let fits = SymbolConfig {
            max_chunk: NonZeroUsize::new(271),
            ..config
        };
        assert!(fits.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let bad_version = SymbolConfig {
            version: 41,
            ..SymbolConfig::default()
        };
        assert!(bad_version.validate().is_err());

        let bad_module = SymbolConfig {
            module_size: 0,
            ..SymbolConfig::default()
        };
        assert!(bad_module.validate().is_err());

        let oversized_chunk = SymbolConfig {
            ec_level: EcLevel::Q,
            max_chunk: NonZeroUsize::new(2000),
            ..SymbolConfig::default()
        };
        let msg = oversized_chunk.validate().unwrap_err().to_string();
        assert!(msg.contains("exceeds the version 40 level Q capacity of 1647"));

        assert!(SymbolConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SymbolConfig = serde_json::from_str(r#"{"ec_level":"M"}"#).unwrap();
        assert_eq!(config.ec_level, EcLevel::M);
        assert_eq!(config.version, 40);
        assert_eq!(config.border, 4);

        let hints: DecodeHints = serde_json::from_str(r#"{"try_harder":false}"#).unwrap();
        assert!(!hints.try_harder);
        assert!(hints.pure_barcode);
    }
}
