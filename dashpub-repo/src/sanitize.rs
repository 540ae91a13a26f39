//! File name sanitization for dashboard paths.

/// Characters rejected by at least one mainstream filesystem.
const ILLEGAL: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make `raw` safe to use as a single path component: illegal and control
/// characters are removed, surrounding whitespace and trailing dots are
/// trimmed. May return an empty string.
pub fn sanitize_component(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| !ILLEGAL.contains(c) && !c.is_control())
        .collect();
    kept.trim()
        .trim_end_matches(|c: char| c == '.' || c == ' ')
        .to_string()
}
