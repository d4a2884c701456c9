//! The noise vault.
//!
//! Before tokenizing, regions the tree builder must treat as opaque
//! (script and style bodies, comments, CDATA sections, processing
//! instructions) are cut out of the input and replaced by fixed-width
//! placeholder tokens. Serialization puts the originals back.

use std::borrow::Cow;
use std::collections::HashSet;

use regex::Regex;

/// Every placeholder starts with this marker.
pub const NOISE_PREFIX: &str = "___noise___";

const KEY_DIGITS: usize = 8;

/// Byte length of a placeholder: the prefix plus an 8-digit key.
pub const PLACEHOLDER_LEN: usize = NOISE_PREFIX.len() + KEY_DIGITS;

const MAX_ENTRIES: usize = 100_000_000;

const UNDEFINED_MARKER: &str = "UNDEFINED NOISE FOR KEY: ";
const MISSING_KEY_MARKER: &str = "NO NUMERIC NOISE KEY";

/// Placeholder to original-text map of one document.
#[derive(Debug, Clone, Default)]
pub struct NoiseVault {
    /// Key `n` is stored at index `n`.
    entries: Vec<String>,
}

impl NoiseVault {
    /// Create an empty vault.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of recorded regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The placeholder token for a key.
    #[must_use]
    pub fn placeholder(key: usize) -> String {
        format!("{NOISE_PREFIX}{key:08}")
    }

    /// The original text recorded under `key`, unrestored.
    #[must_use]
    pub fn get(&self, key: usize) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The first recorded region whose text contains `needle`.
    #[must_use]
    pub fn search(&self, needle: &str) -> Option<&str> {
        self.entries
            .iter()
            .map(String::as_str)
            .find(|entry| entry.contains(needle))
    }

    /// Replace every match of `pattern` in `buffer` with a fresh placeholder.
    ///
    /// With `keep_whole_match` the whole match is vaulted; otherwise only
    /// capture group 1 is (falling back to the whole match if the group did
    /// not participate). Matches are replaced from the last to the first so
    /// earlier offsets stay valid. Returns the number of regions vaulted.
    pub fn extract(&mut self, buffer: &mut String, pattern: &Regex, keep_whole_match: bool) -> usize {
        let group = usize::from(!keep_whole_match);
        let ranges: Vec<_> = pattern
            .captures_iter(buffer)
            .filter_map(|caps| caps.get(group).or_else(|| caps.get(0)))
            .map(|m| m.range())
            .collect();

        let mut vaulted = 0;
        for range in ranges.into_iter().rev() {
            if self.entries.len() >= MAX_ENTRIES {
                break;
            }
            let key = Self::placeholder(self.entries.len());
            self.entries.push(buffer[range.clone()].to_string());
            buffer.replace_range(range, &key);
            vaulted += 1;
        }
        vaulted
    }

    /// Substitute every placeholder in `text` with its original.
    ///
    /// Borrows `text` unchanged when it holds no placeholder.
    #[must_use]
    pub fn restore<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if text.contains(NOISE_PREFIX) {
            let mut out = String::with_capacity(text.len());
            self.restore_into(text, &mut out);
            Cow::Owned(out)
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Append `text` to `out` with placeholders substituted.
    ///
    /// A vaulted region may itself contain placeholders of regions vaulted
    /// by an earlier pattern (a script inside a comment). Those are expanded
    /// too, but only for strictly smaller keys and at most once per call,
    /// so the output is bounded even for adversarial input. A key that is
    /// out of range becomes a visible marker; so does a prefix without an
    /// 8-digit key.
    pub fn restore_into(&self, text: &str, out: &mut String) {
        let mut expanded: HashSet<usize> = HashSet::new();
        let mut pending: Vec<(&str, usize)> = vec![(text, self.entries.len())];

        while let Some((rest, limit)) = pending.pop() {
            let Some(pos) = rest.find(NOISE_PREFIX) else {
                out.push_str(rest);
                continue;
            };
            out.push_str(&rest[..pos]);
            let after = &rest[pos + NOISE_PREFIX.len()..];

            let digits = after
                .get(..KEY_DIGITS)
                .filter(|d| d.bytes().all(|b| b.is_ascii_digit()));
            let Some(digits) = digits else {
                out.push_str(MISSING_KEY_MARKER);
                pending.push((after, limit));
                continue;
            };
            pending.push((&after[KEY_DIGITS..], limit));

            let original = digits
                .parse::<usize>()
                .ok()
                .filter(|&key| key < limit)
                .and_then(|key| self.entries.get(key).map(|entry| (key, entry.as_str())));
            match original {
                Some((key, entry)) if expanded.insert(key) => pending.push((entry, key)),
                Some((_, entry)) => out.push_str(entry),
                None => {
                    out.push_str(UNDEFINED_MARKER);
                    out.push_str(NOISE_PREFIX);
                    out.push_str(digits);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment_pattern() -> Regex {
        Regex::new(r"(?s)<!--(.*?)-->").unwrap()
    }

    #[test]
    fn placeholders_are_fixed_width() {
        assert_eq!(NoiseVault::placeholder(7), "___noise___00000007");
        assert_eq!(NoiseVault::placeholder(7).len(), PLACEHOLDER_LEN);
    }

    #[test]
    fn extract_inner_group_then_restore() {
        let mut vault = NoiseVault::new();
        let mut buffer = "a<!-- one -->b<!--two-->c".to_string();
        assert_eq!(vault.extract(&mut buffer, &comment_pattern(), false), 2);
        assert!(!buffer.contains("one"));
        assert!(buffer.starts_with("a<!--___noise___"));
        assert_eq!(vault.restore(&buffer), "a<!-- one -->b<!--two-->c");
    }

    #[test]
    fn extract_whole_match() {
        let mut vault = NoiseVault::new();
        let pattern = Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap();
        let mut buffer = "x<![CDATA[<p>]]>y".to_string();
        assert_eq!(vault.extract(&mut buffer, &pattern, true), 1);
        assert_eq!(buffer, format!("x{}y", NoiseVault::placeholder(0)));
        assert_eq!(vault.get(0), Some("<![CDATA[<p>]]>"));
    }

    #[test]
    fn nested_regions_restore_fully() {
        let mut vault = NoiseVault::new();
        let script = Regex::new(r"(?is)<\s*script\s*>(.*?)<\s*/\s*script\s*>").unwrap();
        let mut buffer = "<!--<script>if (a<b) {}</script>-->".to_string();
        let _ = vault.extract(&mut buffer, &script, false);
        let _ = vault.extract(&mut buffer, &comment_pattern(), false);
        assert_eq!(vault.len(), 2);
        assert_eq!(vault.restore(&buffer), "<!--<script>if (a<b) {}</script>-->");
    }

    #[test]
    fn unknown_and_truncated_keys_become_markers() {
        let vault = NoiseVault::new();
        assert_eq!(
            vault.restore("[___noise___00000042]"),
            "[UNDEFINED NOISE FOR KEY: ___noise___00000042]"
        );
        assert_eq!(vault.restore("x___noise___12"), "xNO NUMERIC NOISE KEY12");
    }

    #[test]
    fn self_referencing_entries_terminate() {
        let mut vault = NoiseVault::new();
        let mut buffer = "<!--___noise___00000000 ___noise___00000000-->".to_string();
        let _ = vault.extract(&mut buffer, &comment_pattern(), false);
        let restored = vault.restore(&buffer);
        assert!(restored.starts_with("<!--"));
        assert!(restored.contains("UNDEFINED NOISE FOR KEY"));
    }

    #[test]
    fn search_finds_first_region_containing_text() {
        let mut vault = NoiseVault::new();
        let mut buffer = "<!--a-->x<!--ab-->".to_string();
        let _ = vault.extract(&mut buffer, &comment_pattern(), false);
        assert_eq!(vault.search("b"), Some("ab"));
        assert_eq!(vault.search("a"), Some("ab"));
        assert_eq!(vault.search("z"), None);
    }

    #[test]
    fn text_without_placeholders_is_borrowed() {
        let vault = NoiseVault::new();
        assert!(matches!(vault.restore("plain"), Cow::Borrowed("plain")));
    }
}
