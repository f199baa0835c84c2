//! Whitespace-separated numeric payloads.

use crate::error::{Error, Result};
use crate::material::Color;

/// Strip the leading `#` of a COLLADA reference attribute.
pub fn strip_sigil(reference: &str) -> &str {
    reference.strip_prefix('#').unwrap_or(reference)
}

/// Parse a declared count or offset attribute.
pub fn parse_count(value: &str, element: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::malformed(element, value))
}

/// Parse a list of floats.
pub fn parse_floats(text: &str, element: &str) -> Result<Vec<f32>> {
    text.split_ascii_whitespace()
        .map(|token| token.parse::<f32>().map_err(|_| Error::malformed(element, token)))
        .collect()
}

/// Parse a list of floats whose length was declared up front.
///
/// The token count is checked before any token is converted.
pub fn parse_counted_floats(
    text: &str,
    element: &str,
    id: Option<&str>,
    declared: usize,
) -> Result<Vec<f32>> {
    let found = text.split_ascii_whitespace().count();
    if found != declared {
        return Err(Error::count_mismatch(element, id, declared, found));
    }
    parse_floats(text, element)
}

/// Parse a list of non-negative integers (`<p>`, `<vcount>`).
pub fn parse_indices(text: &str, element: &str) -> Result<Vec<u32>> {
    text.split_ascii_whitespace()
        .map(|token| token.parse::<u32>().map_err(|_| Error::malformed(element, token)))
        .collect()
}

/// Parse an `R G B A` color. Any token count other than 4 is an error.
pub fn parse_color(text: &str) -> Result<Color> {
    let values = parse_counted_floats(text, "color", None, 4)?;
    Ok(Color::new(values[0], values[1], values[2], values[3]))
}
