use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{AggregateDecodeFailure, PipelineError, SymbolDecodeError, io_error};
use crate::DecodeSummary;
use crate::config::CodecConfig;
use crate::payload::reassemble_payload;
use crate::symbol::naming::{SYMBOL_EXTENSION, parse_symbol_index};
use crate::symbol::{QrSymbolDecoder, SymbolDecoder, load_symbol};

/// A candidate symbol file and the index parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SymbolFile {
    index: usize,
    name: String,
    path: PathBuf,
}

/// Symbols to scan in index order, plus failures known before scanning.
#[derive(Debug)]
struct ScanPlan {
    symbols: Vec<SymbolFile>,
    failures: Vec<SymbolDecodeError>,
}

/// Rebuild the file stored as QR symbols in `directory`.
///
/// # Errors
/// See [`decode_directory_with`].
pub fn decode_directory(
    directory: &Path,
    output_name: &Path,
    config: &CodecConfig,
) -> Result<DecodeSummary, PipelineError> {
    let decoder = QrSymbolDecoder::new(config.hints);
    decode_directory_with(directory, output_name, &decoder, config.parallel)
}

/// Rebuild a file from the symbols in `directory` with any symbol decoder.
///
/// Every `qrcode_<index>.png` is decoded in lexicographic file-name order.
/// All symbols are attempted before failing, so the returned
/// [`AggregateDecodeFailure`] lists every missing, duplicated, unreadable and
/// undecodable index at once. The output, `directory.join(output_name)`, is
/// written only when every symbol decoded, and silently replaces an existing
/// file.
///
/// # Errors
/// Returns `PipelineError::DirectoryNotFound` for a missing directory,
/// `PipelineError::Misordered` when names are not padded to one width,
/// `PipelineError::Symbols` when any symbol failed, `PipelineError::Payload`
/// when the joined text is not valid base64, and `PipelineError::Io` for
/// filesystem errors.
pub fn decode_directory_with<D: SymbolDecoder>(
    directory: &Path,
    output_name: &Path,
    decoder: &D,
    parallel: bool,
) -> Result<DecodeSummary, PipelineError> {
    if !directory.is_dir() {
        return Err(PipelineError::DirectoryNotFound(directory.to_path_buf()));
    }

    let plan = plan_scan(list_symbol_files(directory)?)?;
    info!(
        directory = %directory.display(),
        symbols = plan.symbols.len(),
        "decoding symbols"
    );

    let results: Vec<Result<String, SymbolDecodeError>> = if parallel {
        plan.symbols
            .par_iter()
            .map(|file| scan_symbol(decoder, file))
            .collect()
    } else {
        plan.symbols
            .iter()
            .map(|file| scan_symbol(decoder, file))
            .collect()
    };

    let mut failures = plan.failures;
    let mut texts = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(text) => texts.push(text),
            Err(failure) => failures.push(failure),
        }
    }
    if !failures.is_empty() {
        failures.sort_by_key(SymbolDecodeError::index);
        for failure in &failures {
            debug!(index = failure.index(), "{failure}");
        }
        info!(failures = failures.len(), "decoding aborted, nothing written");
        return Err(AggregateDecodeFailure { failures }.into());
    }

    let text_chars = texts.iter().map(String::len).sum();
    let bytes = reassemble_payload(&texts)?;
    let output = directory.join(output_name);
    fs::write(&output, &bytes).map_err(|err| io_error(&output, err))?;
    info!(output = %output.display(), bytes = bytes.len(), "file reconstructed");

    Ok(DecodeSummary {
        directory: directory.display().to_string(),
        output: output.display().to_string(),
        symbols: texts.len(),
        text_chars,
        output_bytes: bytes.len() as u64,
    })
}

fn list_symbol_files(directory: &Path) -> Result<Vec<SymbolFile>, PipelineError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(|err| io_error(directory, err))? {
        let entry = entry.map_err(|err| io_error(directory, err))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "skipping file with non UTF-8 name");
            continue;
        };
        if !has_symbol_extension(&name) {
            continue;
        }
        match parse_symbol_index(&name) {
            Some(index) => files.push(SymbolFile { index, name, path }),
            None => warn!(file = %name, "skipping image that is not named like a symbol"),
        }
    }
    Ok(files)
}

fn has_symbol_extension(name: &str) -> bool {
    name.strip_suffix(SYMBOL_EXTENSION)
        .is_some_and(|stem| stem.ends_with('.'))
}

/// Sort candidates by name and derive the scan order.
///
/// Lexicographic order must agree with index order; anything else means the
/// names were not padded to a common width and is rejected outright.
fn plan_scan(mut files: Vec<SymbolFile>) -> Result<ScanPlan, PipelineError> {
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let mut symbols: Vec<SymbolFile> = Vec::with_capacity(files.len());
    let mut failures = Vec::new();
    for file in files {
        if let Some(prev) = symbols.last() {
            if file.index == prev.index {
                failures.push(SymbolDecodeError::Duplicate {
                    index: file.index,
                    path: file.path,
                });
                continue;
            }
            if file.index < prev.index {
                return Err(PipelineError::Misordered {
                    before: prev.name.clone(),
                    after: file.name,
                });
            }
        }
        symbols.push(file);
    }

    let mut expected = 1;
    for file in &symbols {
        if file.index > expected {
            failures.push(SymbolDecodeError::Missing {
                first: expected,
                last: file.index - 1,
            });
        }
        expected = file.index + 1;
    }
    if symbols.is_empty() {
        failures.push(SymbolDecodeError::Missing { first: 1, last: 1 });
    }

    Ok(ScanPlan { symbols, failures })
}

fn scan_symbol<D: SymbolDecoder>(
    decoder: &D,
    file: &SymbolFile,
) -> Result<String, SymbolDecodeError> {
    let image = load_symbol(&file.path).map_err(|err| SymbolDecodeError::Unreadable {
        index: file.index,
        path: file.path.clone(),
        message: err.to_string(),
    })?;
    match decoder.decode(&image) {
        Some(text) => {
            debug!(index = file.index, chars = text.len(), "symbol decoded");
            Ok(text)
        }
        None => Err(SymbolDecodeError::NoPayload {
            index: file.index,
            path: file.path.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{SymbolFile, has_symbol_extension, plan_scan};
    use crate::pipeline::{PipelineError, SymbolDecodeError};
    use crate::symbol::naming::{index_width, symbol_file_name};

    fn file(name: &str, index: usize) -> SymbolFile {
        SymbolFile {
            index,
            name: name.to_string(),
            path: PathBuf::from(name),
        }
    }

    fn padded(count: usize) -> Vec<SymbolFile> {
        let width = index_width(count);
        (1..=count)
            .map(|i| file(&symbol_file_name(i, width), i))
            .collect()
    }

    #[test]
    fn discovery_order_does_not_matter() {
        let ordered = plan_scan(padded(23)).unwrap();
        let mut shuffled = padded(23);
        shuffled.reverse();
        shuffled.swap(3, 17);
        shuffled.rotate_left(5);
        let plan = plan_scan(shuffled).unwrap();
        assert_eq!(plan.symbols, ordered.symbols);
        assert!(plan.failures.is_empty());
        let indices: Vec<_> = plan.symbols.iter().map(|f| f.index).collect();
        assert_eq!(indices, (1..=23).collect::<Vec<_>>());
    }

    #[test]
    fn gap_is_reported_as_missing() {
        let files = vec![file("qrcode_1.png", 1), file("qrcode_3.png", 3)];
        let plan = plan_scan(files).unwrap();
        assert_eq!(plan.symbols.len(), 2);
        assert_eq!(
            plan.failures,
            vec![SymbolDecodeError::Missing { first: 2, last: 2 }]
        );
    }

    #[test]
    fn leading_gap_is_reported() {
        let plan = plan_scan(vec![file("qrcode_4.png", 4)]).unwrap();
        assert_eq!(
            plan.failures,
            vec![SymbolDecodeError::Missing { first: 1, last: 3 }]
        );
    }

    #[test]
    fn empty_directory_misses_first_symbol() {
        let plan = plan_scan(Vec::new()).unwrap();
        assert_eq!(
            plan.failures,
            vec![SymbolDecodeError::Missing { first: 1, last: 1 }]
        );
    }

    #[test]
    fn unpadded_names_are_rejected() {
        let files = vec![
            file("qrcode_1.png", 1),
            file("qrcode_2.png", 2),
            file("qrcode_10.png", 10),
        ];
        let err = plan_scan(files).unwrap_err();
        match err {
            PipelineError::Misordered { before, after } => {
                assert_eq!(before, "qrcode_10.png");
                assert_eq!(after, "qrcode_2.png");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn same_index_twice_is_a_duplicate() {
        let files = vec![file("qrcode_1.png", 1), file("qrcode_01.png", 1)];
        let plan = plan_scan(files).unwrap();
        assert_eq!(plan.symbols, vec![file("qrcode_01.png", 1)]);
        assert_eq!(
            plan.failures,
            vec![SymbolDecodeError::Duplicate {
                index: 1,
                path: PathBuf::from("qrcode_1.png"),
            }]
        );
    }

    #[test]
    fn extension_must_be_exact() {
        assert!(has_symbol_extension("qrcode_1.png"));
        assert!(!has_symbol_extension("qrcode_1png"));
        assert!(!has_symbol_extension("qrcode_1.PNG"));
        assert!(!has_symbol_extension("notes.txt"));
    }
}
