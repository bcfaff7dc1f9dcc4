//! Symbol capabilities: text payload to image and back.
//!
//! The pipelines only see the [`SymbolEncoder`] and [`SymbolDecoder`] traits,
//! so the QR implementations in `qr` can be swapped for another format or a
//! test double without touching the chunking logic. File naming rules live in
//! `naming`; rendering parameters and decoder hints in `config`.
//!
//! Version française (résumé):
//! Les traits `SymbolEncoder`/`SymbolDecoder` isolent le format optique ; les
//! implémentations QR sont dans `qr`, les règles de nommage dans `naming`.

pub mod config;
pub mod error;
pub mod naming;
pub mod qr;

use std::path::Path;

use image::ImageFormat;

pub use config::{DecodeHints, EcLevel, SymbolConfig};
pub use error::SymbolError;
pub use qr::{QrSymbolDecoder, QrSymbolEncoder};

/// Greyscale raster holding one rendered symbol.
pub type SymbolImage = image::GrayImage;

/// Intensity of a dark module.
pub const DARK: u8 = 0;
/// Intensity of a light module and of the quiet zone.
pub const LIGHT: u8 = 255;

/// Renders one text payload as a scannable image.
pub trait SymbolEncoder: Send + Sync {
    /// # Errors
    /// Returns `SymbolError::Render` when the payload does not fit the symbol.
    fn render(&self, text: &str) -> Result<SymbolImage, SymbolError>;
}

/// Extracts the text payload from a scanned image, if one can be found.
pub trait SymbolDecoder: Send + Sync {
    fn decode(&self, image: &SymbolImage) -> Option<String>;
}

/// Load an image from disk as greyscale.
///
/// # Errors
/// Returns `SymbolError::Image` when the file cannot be opened or decoded.
pub fn load_symbol(path: &Path) -> Result<SymbolImage, SymbolError> {
    Ok(image::open(path)?.into_luma8())
}

/// Save a symbol image as PNG.
///
/// # Errors
/// Returns `SymbolError::Image` when the file cannot be encoded or written.
pub fn save_symbol(image: &SymbolImage, path: &Path) -> Result<(), SymbolError> {
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
