use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{PipelineError, io_error};
use crate::EncodeSummary;
use crate::config::CodecConfig;
use crate::payload::{Chunk, encode_text, split_chunks};
use crate::symbol::naming::{index_width, parse_symbol_index, symbol_file_name};
use crate::symbol::{QrSymbolEncoder, SymbolEncoder, save_symbol};

/// Encode `source` into QR symbol images written to `directory`.
///
/// # Errors
/// See [`encode_file_with`]; additionally fails with
/// `PipelineError::Config` when the symbol configuration is invalid.
pub fn encode_file(
    source: &Path,
    directory: &Path,
    config: &CodecConfig,
) -> Result<EncodeSummary, PipelineError> {
    let encoder = QrSymbolEncoder::new(config.symbol.clone())?;
    encode_file_with(source, directory, &encoder, config)
}

/// Encode `source` with any symbol encoder.
///
/// The directory is created when missing. Symbols are named
/// `qrcode_<index>.png` with the index zero-padded to the digit count of the
/// symbol total. The first render or write failure aborts the run; files
/// already written are left in place.
///
/// # Errors
/// Returns `PipelineError` when the source is missing or not a regular file,
/// the directory cannot be created, or a symbol cannot be rendered or written.
pub fn encode_file_with<E: SymbolEncoder>(
    source: &Path,
    directory: &Path,
    encoder: &E,
    config: &CodecConfig,
) -> Result<EncodeSummary, PipelineError> {
    let meta = match fs::metadata(source) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(PipelineError::SourceNotFound(source.to_path_buf()));
        }
        Err(err) => return Err(io_error(source, err)),
    };
    if !meta.is_file() {
        return Err(PipelineError::SourceNotFile(source.to_path_buf()));
    }

    fs::create_dir_all(directory).map_err(|err| io_error(directory, err))?;
    warn_on_existing_symbols(directory)?;

    let bytes = fs::read(source).map_err(|err| io_error(source, err))?;
    let text = encode_text(&bytes);
    let chunk_limit = config.symbol.chunk_limit();
    let chunks = split_chunks(&text, chunk_limit);
    let width = index_width(chunks.len());
    info!(
        source = %source.display(),
        bytes = bytes.len(),
        chunks = chunks.len(),
        chunk_limit = chunk_limit.get(),
        "encoding file"
    );

    let write_symbol = |chunk: &Chunk<'_>| -> Result<String, PipelineError> {
        let name = symbol_file_name(chunk.index, width);
        let image = encoder
            .render(chunk.text)
            .map_err(|source| PipelineError::Render {
                index: chunk.index,
                source,
            })?;
        let path = directory.join(&name);
        save_symbol(&image, &path).map_err(|source| PipelineError::WriteSymbol {
            path: path.clone(),
            source,
        })?;
        debug!(
            index = chunk.index,
            chars = chunk.text.len(),
            path = %path.display(),
            "symbol written"
        );
        Ok(name)
    };

    let symbols = if config.parallel {
        chunks
            .par_iter()
            .map(write_symbol)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        chunks
            .iter()
            .map(write_symbol)
            .collect::<Result<Vec<_>, _>>()?
    };

    info!(directory = %directory.display(), symbols = symbols.len(), "encoding complete");
    Ok(EncodeSummary {
        source: source.display().to_string(),
        source_bytes: bytes.len() as u64,
        text_chars: text.len(),
        chunk_limit: chunk_limit.get(),
        ec_level: config.symbol.ec_level,
        symbol_version: config.symbol.version,
        directory: directory.display().to_string(),
        symbols,
    })
}

fn warn_on_existing_symbols(directory: &Path) -> Result<(), PipelineError> {
    let mut existing = 0usize;
    for entry in fs::read_dir(directory).map_err(|err| io_error(directory, err))? {
        let entry = entry.map_err(|err| io_error(directory, err))?;
        if entry
            .file_name()
            .to_str()
            .and_then(parse_symbol_index)
            .is_some()
        {
            existing += 1;
        }
    }
    if existing > 0 {
        warn!(
            directory = %directory.display(),
            existing,
            "directory already holds symbol images; leftovers from another run will break decoding"
        );
    }
    Ok(())
}
