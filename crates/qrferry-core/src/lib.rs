//! qrferry core library: move a file through a sequence of QR codes.
//!
//! The encoder reads a file, encodes it as base64 text, splits the text into
//! chunks that fit one QR symbol each and writes the symbols as numbered PNG
//! images. The decoder reads such a directory back, decodes every symbol,
//! joins the chunks in index order and restores the original bytes.
//!
//! Layering follows the data flow: `payload` is pure text/chunk logic,
//! `symbol` holds the optical capability traits plus the QR implementations
//! and the naming scheme, `pipeline` does the file system work and drives
//! the other two.
//!
//! Invariants:
//! - `reassemble_payload(chunk_payload(b)) == b` for every byte string, empty
//!   included (an empty file is one empty chunk and one symbol).
//! - Chunk order is carried by the file name only; indices are zero-padded
//!   to one width so a lexicographic sort is also the index order.
//! - Decoding either writes the complete file or nothing.
//!
//! Version française (résumé):
//! Cette crate transporte un fichier via une suite de QR codes : base64,
//! découpage en blocs, une image PNG numérotée par bloc. Le décodage lit
//! toutes les images, signale d'un coup chaque symbole manquant ou illisible
//! et n'écrit le fichier que si tout a été décodé.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use qrferry_core::{CodecConfig, decode_directory, encode_file};
//!
//! let config = CodecConfig::default();
//! let encoded = encode_file(Path::new("secret.bin"), Path::new("symbols"), &config)?;
//! println!("{} symbols written", encoded.symbols.len());
//!
//! let decoded = decode_directory(Path::new("symbols"), Path::new("restored.bin"), &config)?;
//! println!("{} bytes restored", decoded.output_bytes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod config;
pub mod payload;
mod pipeline;
pub mod symbol;

pub use config::{CodecConfig, ConfigError};
pub use payload::{MAX_CHUNK, PayloadError, chunk_payload, reassemble_payload};
pub use pipeline::{
    AggregateDecodeFailure, PipelineError, SymbolDecodeError, decode_directory,
    decode_directory_with, encode_file, encode_file_with,
};
pub use symbol::{EcLevel, SymbolDecoder, SymbolEncoder, SymbolImage};

/// Result of a successful encode run.
///
/// # Examples
/// ```
/// use qrferry_core::{EcLevel, EncodeSummary};
///
/// let summary = EncodeSummary {
///     source: "secret.bin".to_string(),
///     source_bytes: 4000,
///     text_chars: 5336,
///     chunk_limit: 2937,
///     ec_level: EcLevel::L,
///     symbol_version: 40,
///     directory: "symbols".to_string(),
///     symbols: vec!["qrcode_1.png".to_string(), "qrcode_2.png".to_string()],
/// };
/// assert_eq!(summary.symbols.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSummary {
    /// Source path as provided.
    pub source: String,
    /// Source size in bytes.
    pub source_bytes: u64,
    /// Length of the encoded text.
    pub text_chars: usize,
    /// Characters carried per symbol.
    pub chunk_limit: usize,
    /// Error-correction level used for every symbol.
    pub ec_level: EcLevel,
    /// QR version used for every symbol.
    pub symbol_version: u8,
    /// Output directory as provided.
    pub directory: String,
    /// Symbol file names in index order.
    pub symbols: Vec<String>,
}

/// Result of a successful decode run.
///
/// # Examples
/// ```
/// use qrferry_core::DecodeSummary;
///
/// let summary = DecodeSummary {
///     directory: "symbols".to_string(),
///     output: "symbols/restored.bin".to_string(),
///     symbols: 2,
///     text_chars: 5336,
///     output_bytes: 4000,
/// };
/// assert_eq!(summary.output_bytes, 4000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    /// Symbol directory as provided.
    pub directory: String,
    /// Path of the reconstructed file.
    pub output: String,
    /// Number of symbols joined.
    pub symbols: usize,
    /// Length of the joined text.
    pub text_chars: usize,
    /// Size of the reconstructed file in bytes.
    pub output_bytes: u64,
}
