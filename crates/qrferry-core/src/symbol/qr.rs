//! QR code implementations of the symbol capabilities.

use image::{GrayImage, Luma};
use qrcode::{Color, QrCode, Version};
use tracing::debug;

use super::config::{DecodeHints, SymbolConfig};
use super::error::SymbolError;
use super::{DARK, LIGHT, SymbolDecoder, SymbolEncoder, SymbolImage};

/// Extra white margin, in pixels, added on the first `try_harder` retry.
const RETRY_MARGIN: u32 = 32;

/// Renders text payloads as QR codes of one fixed version and level.
#[derive(Debug, Clone)]
pub struct QrSymbolEncoder {
    config: SymbolConfig,
}

impl QrSymbolEncoder {
    /// # Errors
    /// Returns `SymbolError::InvalidConfig` when the configuration is out of range.
    pub fn new(config: SymbolConfig) -> Result<Self, SymbolError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SymbolConfig {
        &self.config
    }
}

impl SymbolEncoder for QrSymbolEncoder {
    fn render(&self, text: &str) -> Result<SymbolImage, SymbolError> {
        let version = Version::Normal(i16::from(self.config.version));
        let code = QrCode::with_version(text.as_bytes(), version, self.config.ec_level.into())
            .map_err(|err| SymbolError::Render(format!("{err} ({} chars)", text.len())))?;
        Ok(paint(&code, self.config.module_size, self.config.border))
    }
}

fn paint(code: &QrCode, module_size: u32, border: u32) -> GrayImage {
    let modules = code.width();
    let side = (modules as u32 + 2 * border) * module_size;
    GrayImage::from_fn(side, side, |x, y| {
        let mx = (x / module_size).checked_sub(border).map(|v| v as usize);
        let my = (y / module_size).checked_sub(border).map(|v| v as usize);
        match (mx, my) {
            (Some(mx), Some(my)) if mx < modules && my < modules => {
                if code[(mx, my)] == Color::Dark {
                    Luma([DARK])
                } else {
                    Luma([LIGHT])
                }
            }
            _ => Luma([LIGHT]),
        }
    })
}

/// Extracts the text payload of a QR code filling the frame.
#[derive(Debug, Clone, Default)]
pub struct QrSymbolDecoder {
    hints: DecodeHints,
}

impl QrSymbolDecoder {
    pub fn new(hints: DecodeHints) -> Self {
        Self { hints }
    }

    pub fn hints(&self) -> DecodeHints {
        self.hints
    }
}

impl SymbolDecoder for QrSymbolDecoder {
    fn decode(&self, image: &SymbolImage) -> Option<String> {
        if let Some(text) = scan(image, self.hints.pure_barcode) {
            return Some(text);
        }
        if !self.hints.try_harder {
            return None;
        }
        debug!("plain scan failed, retrying with added margin");
        if let Some(text) = scan(&with_margin(image, RETRY_MARGIN), self.hints.pure_barcode) {
            return Some(text);
        }
        debug!("margin retry failed, retrying inverted");
        let mut inverted = image.clone();
        image::imageops::invert(&mut inverted);
        scan(&inverted, self.hints.pure_barcode)
    }
}

fn scan(image: &GrayImage, pure_barcode: bool) -> Option<String> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            image.get_pixel(x as u32, y as u32)[0]
        });
    let grids = prepared.detect_grids();
    if pure_barcode && grids.len() > 1 {
        debug!(grids = grids.len(), "frame holds more than one symbol");
        return None;
    }
    grids.iter().find_map(|grid| match grid.decode() {
        Ok((_, text)) => Some(text),
        Err(err) => {
            debug!(error = %err, "grid decode failed");
            None
        }
    })
}

fn with_margin(image: &GrayImage, margin: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut padded = GrayImage::from_pixel(width + 2 * margin, height + 2 * margin, Luma([LIGHT]));
    image::imageops::replace(&mut padded, image, i64::from(margin), i64::from(margin));
    padded
}
