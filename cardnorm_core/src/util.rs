//! Text normalization helpers shared by the analysis pipeline.

/// Convert full-width ASCII variants (`Ａ`, `１`, `（` ...) and the ideographic
/// space to their half-width forms. Everything else passes through.
#[must_use]
pub fn to_half_width(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(u32::from(c) - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

/// Truncate `text` to at most `max_bytes` bytes without splitting a character.
#[must_use]
pub fn truncate_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
