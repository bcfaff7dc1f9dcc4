/// Largest chunk, in characters, carried by one symbol at version 40 / level L.
pub const MAX_CHUNK: usize = 2937;

/// Characters produced per group of input bytes.
pub const TEXT_GROUP_CHARS: usize = 4;
/// Input bytes consumed per text group.
pub const TEXT_GROUP_BYTES: usize = 3;
