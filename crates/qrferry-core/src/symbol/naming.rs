//! Symbol file naming.
//!
//! Symbols are stored as `qrcode_<index>.png` with the 1-based index
//! zero-padded to the digit count of the total symbol count. The decoder
//! orders symbols by a plain lexicographic sort of file names, so every
//! symbol of one run must share the same width; this is what keeps index 10
//! from sorting before index 2.

/// File name prefix shared by every symbol.
pub const SYMBOL_PREFIX: &str = "qrcode_";
/// File extension shared by every symbol (without the dot).
pub const SYMBOL_EXTENSION: &str = "png";

/// Digit width used for indices when a run emits `count` symbols.
///
/// Equals `ceil(log10(count + 1))`, never less than 1.
///
/// # Examples
/// ```
/// use qrferry_core::symbol::naming::index_width;
///
/// assert_eq!(index_width(1), 1);
/// assert_eq!(index_width(9), 1);
/// assert_eq!(index_width(10), 2);
/// assert_eq!(index_width(100), 3);
/// ```
pub fn index_width(count: usize) -> usize {
    let mut width = 1;
    let mut rest = count / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    width
}

/// File name of the symbol at `index`, padded to `width` digits.
///
/// # Examples
/// ```
/// use qrferry_core::symbol::naming::symbol_file_name;
///
/// assert_eq!(symbol_file_name(2, 1), "qrcode_2.png");
/// assert_eq!(symbol_file_name(2, 3), "qrcode_002.png");
/// ```
pub fn symbol_file_name(index: usize, width: usize) -> String {
    format!("{SYMBOL_PREFIX}{index:0width$}.{SYMBOL_EXTENSION}")
}

/// Parse the 1-based index out of a symbol file name.
///
/// Any digit width is accepted so unpadded names from older runs still
/// parse. Returns `None` for names outside the pattern and for index 0.
///
/// # Examples
/// ```
/// use qrferry_core::symbol::naming::parse_symbol_index;
///
/// assert_eq!(parse_symbol_index("qrcode_007.png"), Some(7));
/// assert_eq!(parse_symbol_index("qrcode_.png"), None);
/// assert_eq!(parse_symbol_index("photo.png"), None);
/// ```
pub fn parse_symbol_index(file_name: &str) -> Option<usize> {
    let digits = file_name
        .strip_prefix(SYMBOL_PREFIX)?
        .strip_suffix(SYMBOL_EXTENSION)?
        .strip_suffix('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<usize>() {
        Ok(0) | Err(_) => None,
        Ok(index) => Some(index),
    }
}
