use thiserror::Error;

/// Errors raised while rendering, loading or saving a symbol image.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("symbol render failed: {0}")]
    Render(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid symbol configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown error-correction level '{0}' (expected L, M, Q or H)")]
    UnknownEcLevel(String),
}
