//! Character sets and small predicates shared by the tree builder.

/// Whitespace between tokens inside a tag.
pub const TOKEN_BLANK: &[u8] = b" \t\r\n";

/// Ends a tag name.
pub const TOKEN_SLASH: &[u8] = b" />\r\n\t";

/// Ends an attribute name.
pub const TOKEN_EQUAL: &[u8] = b" \t\r\n=/>";

/// Ends an unquoted attribute value.
pub const TOKEN_ATTR: &[u8] = b" \t\r\n>";

/// Ends the remainder of an invalid tag.
pub const TOKEN_ANGLE: &[u8] = b"<>";

/// Characters trimmed from `class` values.
pub const TRIM_CHARS: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

/// `\w[\w:-]*` over ASCII word characters.
#[must_use]
pub fn is_valid_tag_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|first| first.is_ascii_alphanumeric() || first == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-'))
}

/// Drop CR and LF from an attribute value.
#[must_use]
pub fn strip_line_breaks(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}
