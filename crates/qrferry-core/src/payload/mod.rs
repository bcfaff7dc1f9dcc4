//! Payload protocol: bytes to bounded text chunks and back.
//!
//! Bytes are encoded as padded standard base64, split into chunks of at most
//! [`MAX_CHUNK`] characters (one chunk per symbol) and, on the way back,
//! concatenated in index order and decoded. Everything here is pure; file and
//! image handling live in `symbol` and `pipeline`.
//!
//! Empty input maps to one empty chunk, and one empty chunk joins back to the
//! empty text, so an empty file still produces exactly one symbol.
//!
//! Version française (résumé):
//! Les octets sont encodés en base64, découpés en blocs d'au plus
//! `MAX_CHUNK` caractères puis, au décodage, concaténés dans l'ordre des
//! indices. Un fichier vide donne un seul bloc vide.

pub mod chunk;
pub mod error;
pub mod layout;
pub mod text;

use std::num::NonZeroUsize;

pub use chunk::{Chunk, chunk_count, join_chunks, split_chunks};
pub use error::PayloadError;
pub use layout::MAX_CHUNK;
pub use text::{decode_text, encode_text, encoded_len};

/// Encode `bytes` and split the text into owned chunk payloads.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use qrferry_core::payload::{chunk_payload, reassemble_payload};
///
/// let max = NonZeroUsize::new(4).unwrap();
/// let chunks = chunk_payload(b"hello world", max);
/// assert_eq!(chunks.len(), 4);
/// assert_eq!(reassemble_payload(&chunks)?, b"hello world");
/// # Ok::<(), qrferry_core::payload::PayloadError>(())
/// ```
pub fn chunk_payload(bytes: &[u8], max_len: NonZeroUsize) -> Vec<String> {
    let text = encode_text(bytes);
    split_chunks(&text, max_len)
        .into_iter()
        .map(|chunk| chunk.text.to_string())
        .collect()
}

/// Join chunk payloads in the given order and decode them back into bytes.
///
/// # Errors
/// Returns `PayloadError` when the joined text is not valid base64.
pub fn reassemble_payload<I, S>(chunks: I) -> Result<Vec<u8>, PayloadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    decode_text(&join_chunks(chunks))
}
