use std::num::NonZeroUsize;

/// A contiguous slice of encoded text carried by exactly one symbol.
///
/// The index is 1-based and travels only in the symbol's file name, never in
/// the text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub text: &'a str,
}

/// Split `text` into consecutive chunks of at most `max_len` characters.
///
/// Every chunk but the last holds exactly `max_len` characters. Empty text
/// yields a single empty chunk so that one symbol is always emitted; see
/// [`join_chunks`] for the inverse.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use qrferry_core::payload::split_chunks;
///
/// let max = NonZeroUsize::new(3).unwrap();
/// let chunks = split_chunks("abcdefg", max);
/// let texts: Vec<_> = chunks.iter().map(|c| c.text).collect();
/// assert_eq!(texts, ["abc", "def", "g"]);
/// assert_eq!(chunks[2].index, 3);
///
/// let empty = split_chunks("", max);
/// assert_eq!(empty.len(), 1);
/// assert_eq!(empty[0].text, "");
/// ```
pub fn split_chunks(text: &str, max_len: NonZeroUsize) -> Vec<Chunk<'_>> {
    let max_len = max_len.get();
    let mut chunks = Vec::with_capacity(chunk_count(text.len(), max_len));
    let mut start = 0;
    let mut chars = 0;
    for (offset, _) in text.char_indices() {
        if chars == max_len {
            chunks.push(Chunk {
                index: chunks.len() + 1,
                text: &text[start..offset],
            });
            start = offset;
            chars = 0;
        }
        chars += 1;
    }
    chunks.push(Chunk {
        index: chunks.len() + 1,
        text: &text[start..],
    });
    chunks
}

/// Number of chunks [`split_chunks`] produces for text of `text_len` characters.
///
/// # Examples
/// ```
/// use qrferry_core::payload::chunk_count;
///
/// assert_eq!(chunk_count(0, 2937), 1);
/// assert_eq!(chunk_count(2937, 2937), 1);
/// assert_eq!(chunk_count(5336, 2937), 2);
/// ```
pub fn chunk_count(text_len: usize, max_len: usize) -> usize {
    text_len.div_ceil(max_len.max(1)).max(1)
}

/// Concatenate chunk texts in the order given.
///
/// No ordering or gap detection happens here; callers establish the order
/// from the chunk indices first. A single empty chunk joins to empty text.
pub fn join_chunks<I, S>(chunks: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    chunks.into_iter().fold(String::new(), |mut text, chunk| {
        text.push_str(chunk.as_ref());
        text
    })
}
