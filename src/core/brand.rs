//! Brand String Helpers
//! Assembly of the 48-byte CPUID brand buffer plus the widening and trimming applied to it.

use crate::cpuid::Registers;

/// Space, tab, CR, LF.
pub const DEFAULT_TRIM: &[char] = &[' ', '\t', '\r', '\n'];

pub const BRAND_LEN: usize = 48;

/// Concatenate three leaves, eax..edx each, into the raw brand buffer.
pub fn assemble(leaves: [Registers; 3]) -> [u8; BRAND_LEN] {
    bytemuck::cast(leaves)
}

/// Widen each byte to the char with the same code point, stopping at the first NUL.
///
/// This is not a charset decode: a byte >= 0x80 becomes U+0080..U+00FF.
pub fn widen(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| char::from(b))
        .collect()
}

pub fn trim_left_with<'a>(s: &'a str, set: &[char]) -> &'a str {
    s.trim_start_matches(|c: char| set.contains(&c))
}

pub fn trim_right_with<'a>(s: &'a str, set: &[char]) -> &'a str {
    s.trim_end_matches(|c: char| set.contains(&c))
}

pub fn trim_with<'a>(s: &'a str, set: &[char]) -> &'a str {
    trim_left_with(trim_right_with(s, set), set)
}

/// UTF-16 code units, for callers that hand the brand to wide-character APIs.
pub fn encode_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Full pipeline: raw leaves -> trimmed brand.
pub fn decode(leaves: [Registers; 3], set: &[char]) -> String {
    let raw = assemble(leaves);
    trim_with(&widen(&raw), set).to_string()
}
