use thiserror::Error;

/// Errors returned when reassembled text cannot be turned back into bytes.
///
/// # Examples
/// ```
/// use qrferry_core::payload::{PayloadError, decode_text};
///
/// let err = decode_text("no spaces allowed").unwrap_err();
/// assert!(matches!(err, PayloadError::MalformedText(_)));
/// ```
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed text: {0}")]
    MalformedText(#[from] base64::DecodeError),
}
