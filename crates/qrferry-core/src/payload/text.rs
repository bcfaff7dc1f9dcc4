use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use super::error::PayloadError;
use super::layout;

/// Encode raw bytes as padded standard base64 text.
///
/// # Examples
/// ```
/// use qrferry_core::payload::encode_text;
///
/// assert_eq!(encode_text(b"hi!"), "aGkh");
/// assert_eq!(encode_text(b""), "");
/// ```
pub fn encode_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode padded standard base64 text back into bytes.
///
/// # Errors
/// Returns `PayloadError::MalformedText` when the text holds a character
/// outside the alphabet, has a length that is not a multiple of 4, or carries
/// padding anywhere but the end.
pub fn decode_text(text: &str) -> Result<Vec<u8>, PayloadError> {
    Ok(STANDARD.decode(text)?)
}

/// Length of the text produced by [`encode_text`] for `byte_len` input bytes.
///
/// # Examples
/// ```
/// use qrferry_core::payload::encoded_len;
///
/// assert_eq!(encoded_len(4000), 5336);
/// assert_eq!(encoded_len(0), 0);
/// ```
pub fn encoded_len(byte_len: usize) -> usize {
    byte_len.div_ceil(layout::TEXT_GROUP_BYTES) * layout::TEXT_GROUP_CHARS
}
