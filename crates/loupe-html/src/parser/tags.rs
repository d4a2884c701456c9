//! Tag tables driving implicit closes.
//!
//! All lookups take lowercase names.

/// Elements that never have content or an end tag.
#[must_use]
pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// End tags of these may close ancestors whose own end tag is missing.
#[must_use]
pub fn is_block(tag: &str) -> bool {
    matches!(tag, "body" | "div" | "form" | "root" | "span" | "table")
}

/// Returns `true` if `tag` has an entry in the optional-closing table.
#[must_use]
pub fn has_optional_close(tag: &str) -> bool {
    closed_by(tag).is_some()
}

/// Returns `true` if a start tag `opening` implicitly closes an open `open` element.
#[must_use]
pub fn closes_implicitly(opening: &str, open: &str) -> bool {
    closed_by(opening).is_some_and(|closed| closed.contains(&open))
}

/// Open elements implicitly closed by a start tag.
fn closed_by(tag: &str) -> Option<&'static [&'static str]> {
    let closed: &'static [&'static str] = match tag {
        "b" => &["b"],
        "dd" | "dl" | "dt" => &["dd", "dt"],
        "li" => &["li"],
        "optgroup" | "option" => &["optgroup", "option"],
        "p" => &["p"],
        "rp" | "rt" => &["rp", "rt"],
        "td" | "th" => &["td", "th"],
        "tr" => &["td", "th", "tr"],
        _ => return None,
    };
    Some(closed)
}
