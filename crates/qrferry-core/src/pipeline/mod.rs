//! Encode and decode orchestration.
//!
//! The encoder turns one file into a directory of symbol images; the decoder
//! turns such a directory back into the file. The two share no state and
//! communicate only through the directory. Symbol work may run on a rayon
//! pool, but names are always assigned from the chunk index and decode
//! results are collected per index before anything is joined.
//!
//! Decoding never stops at the first bad symbol: every symbol is attempted,
//! all failures are reported together, and no output file is written unless
//! every symbol decoded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payload::PayloadError;
use crate::symbol::SymbolError;

mod decode;
mod encode;

pub use decode::{decode_directory, decode_directory_with};
pub use encode::{encode_file, encode_file_with};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("source is not a regular file: {}", .0.display())]
    SourceNotFile(PathBuf),
    #[error("symbol directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("invalid configuration: {0}")]
    Config(#[from] SymbolError),
    #[error("failed to render symbol {index}: {source}")]
    Render {
        index: usize,
        #[source]
        source: SymbolError,
    },
    #[error("failed to write symbol {}: {source}", .path.display())]
    WriteSymbol {
        path: PathBuf,
        #[source]
        source: SymbolError,
    },
    #[error(
        "symbol names are not in index order: {before} sorts before {after}; indices must be zero-padded to one width"
    )]
    Misordered { before: String, after: String },
    #[error(transparent)]
    Symbols(#[from] AggregateDecodeFailure),
    #[error("reassembled payload is malformed: {0}")]
    Payload(#[from] PayloadError),
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// One symbol that could not contribute its chunk.
///
/// # Examples
/// ```
/// use qrferry_core::SymbolDecodeError;
///
/// let err = SymbolDecodeError::Missing { first: 2, last: 2 };
/// assert_eq!(err.index(), 2);
/// assert_eq!(err.to_string(), "symbol 2 is missing");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolDecodeError {
    /// No file carries these indices (inclusive range).
    #[error("{}", describe_missing(.first, .last))]
    Missing { first: usize, last: usize },
    /// The file exists but is not a readable image.
    #[error("symbol {index} could not be read from {}: {message}", .path.display())]
    Unreadable {
        index: usize,
        path: PathBuf,
        message: String,
    },
    /// The image holds no decodable symbol.
    #[error("symbol {index} has no decodable payload: {}", .path.display())]
    NoPayload { index: usize, path: PathBuf },
    /// A second file claims an index already taken.
    #[error("symbol {index} appears more than once: {}", .path.display())]
    Duplicate { index: usize, path: PathBuf },
}

impl SymbolDecodeError {
    /// First chunk index this failure refers to.
    pub fn index(&self) -> usize {
        match self {
            SymbolDecodeError::Missing { first, .. } => *first,
            SymbolDecodeError::Unreadable { index, .. }
            | SymbolDecodeError::NoPayload { index, .. }
            | SymbolDecodeError::Duplicate { index, .. } => *index,
        }
    }

    /// Whether this failure covers chunk `index`.
    pub fn covers(&self, index: usize) -> bool {
        match self {
            SymbolDecodeError::Missing { first, last } => (*first..=*last).contains(&index),
            _ => self.index() == index,
        }
    }
}

fn describe_missing(first: &usize, last: &usize) -> String {
    if first == last {
        format!("symbol {first} is missing")
    } else {
        format!("symbols {first}..={last} are missing")
    }
}

/// Every symbol failure found while scanning a directory, sorted by index.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{} symbol failure(s), nothing written: {}", .failures.len(), summarize(.failures))]
pub struct AggregateDecodeFailure {
    pub failures: Vec<SymbolDecodeError>,
}

impl AggregateDecodeFailure {
    /// Whether any failure covers chunk `index`.
    pub fn covers(&self, index: usize) -> bool {
        self.failures.iter().any(|failure| failure.covers(index))
    }
}

fn summarize(failures: &[SymbolDecodeError]) -> String {
    failures
        .iter()
        .map(|failure| match failure {
            SymbolDecodeError::Missing { first, last } if first != last => {
                format!("{first}..={last} missing")
            }
            SymbolDecodeError::Missing { first, .. } => format!("{first} missing"),
            SymbolDecodeError::Unreadable { index, .. } => format!("{index} unreadable"),
            SymbolDecodeError::NoPayload { index, .. } => format!("{index} undecodable"),
            SymbolDecodeError::Duplicate { index, .. } => format!("{index} duplicated"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
