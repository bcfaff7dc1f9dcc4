#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::path::Path;

use qrferry_core::symbol::{SymbolConfig, SymbolError};
use qrferry_core::{CodecConfig, SymbolDecoder, SymbolEncoder, SymbolImage};

const MARKER: u8 = 0xA7;

/// Stores the payload bytes in a one-row image behind a marker pixel.
pub struct RowCodec;

impl SymbolEncoder for RowCodec {
    fn render(&self, text: &str) -> Result<SymbolImage, SymbolError> {
        let mut pixels = vec![MARKER];
        pixels.extend_from_slice(text.as_bytes());
        let width = pixels.len() as u32;
        Ok(image::GrayImage::from_raw(width, 1, pixels).expect("row image"))
    }
}

impl SymbolDecoder for RowCodec {
    fn decode(&self, image: &SymbolImage) -> Option<String> {
        let raw = image.as_raw();
        if image.height() != 1 || raw.first() != Some(&MARKER) {
            return None;
        }
        String::from_utf8(raw[1..].to_vec()).ok()
    }
}

pub fn config_with_chunk(max_chunk: usize) -> CodecConfig {
    CodecConfig {
        symbol: SymbolConfig {
            max_chunk: NonZeroUsize::new(max_chunk),
            ..SymbolConfig::default()
        },
        ..CodecConfig::default()
    }
}

pub fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 131 % 256) as u8 ^ (i >> 8) as u8).collect()
}

pub fn write_source(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write source");
    path
}

pub fn symbol_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("qrcode_"))
        .collect();
    names.sort();
    names
}
