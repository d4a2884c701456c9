//! Regions vaulted before tree building, in application order.

use std::sync::LazyLock;

use loupe_dom::NoiseVault;
use regex::Regex;

/// Script bodies whose start tag carries attributes.
static SCRIPT_WITH_ATTRS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*script[^>]*[^/]>(.*?)<\s*/\s*script\s*>")
        .expect("SCRIPT_WITH_ATTRS_RE: hardcoded regex is valid")
});

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*script\s*>(.*?)<\s*/\s*script\s*>")
        .expect("SCRIPT_RE: hardcoded regex is valid")
});

static STYLE_WITH_ATTRS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*style[^>]*[^/]>(.*?)<\s*/\s*style\s*>")
        .expect("STYLE_WITH_ATTRS_RE: hardcoded regex is valid")
});

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*style\s*>(.*?)<\s*/\s*style\s*>")
        .expect("STYLE_RE: hardcoded regex is valid")
});

/// Preformatted code samples are kept out of the tree.
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*code[^>]*>(.*?)<\s*/\s*code\s*>").expect("CODE_RE: hardcoded regex is valid")
});

/// Only the comment body is vaulted, so the comment still parses as one.
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("COMMENT_RE: hardcoded regex is valid"));

static CDATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!\[CDATA\[(.*?)\]\]>").expect("CDATA_RE: hardcoded regex is valid")
});

static PROCESSING_INSTRUCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<\?)(.*?)(\?>)").expect("PROCESSING_INSTRUCTION_RE: hardcoded regex is valid")
});

static TEMPLATE_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(\{\w)(.*?)(\})").expect("TEMPLATE_DIRECTIVE_RE: hardcoded regex is valid")
});

/// Vault every opaque region of `buffer`. Returns the number of regions.
pub fn extract_noise(vault: &mut NoiseVault, buffer: &mut String, template_directives: bool) -> usize {
    let passes: [(&Regex, bool); 8] = [
        (&SCRIPT_WITH_ATTRS_RE, false),
        (&SCRIPT_RE, false),
        (&STYLE_WITH_ATTRS_RE, false),
        (&STYLE_RE, false),
        (&CODE_RE, false),
        (&COMMENT_RE, false),
        (&CDATA_RE, true),
        (&PROCESSING_INSTRUCTION_RE, true),
    ];
    let mut vaulted: usize = passes
        .iter()
        .map(|&(pattern, keep_whole)| vault.extract(buffer, pattern, keep_whole))
        .sum();
    if template_directives {
        vaulted += vault.extract(buffer, &TEMPLATE_DIRECTIVE_RE, true);
    }
    vaulted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_bodies_are_hidden() {
        let mut vault = NoiseVault::new();
        let mut buffer = r#"<script type="x">a < b</script><script>c</script>"#.to_string();
        assert_eq!(extract_noise(&mut vault, &mut buffer, false), 2);
        assert!(!buffer.contains("a < b"));
        assert!(buffer.starts_with(r#"<script type="x">___noise___"#));
        assert_eq!(
            vault.restore(&buffer),
            r#"<script type="x">a < b</script><script>c</script>"#
        );
    }

    #[test]
    fn code_bodies_are_hidden() {
        let mut vault = NoiseVault::new();
        let mut buffer = "<code class=\"rs\">if a<b {}</code><p>x</p>".to_string();
        assert_eq!(extract_noise(&mut vault, &mut buffer, false), 1);
        assert!(buffer.starts_with("<code class=\"rs\">___noise___"));
        assert!(buffer.ends_with("</code><p>x</p>"));
    }

    #[test]
    fn cdata_and_instructions_are_vaulted_whole() {
        let mut vault = NoiseVault::new();
        let mut buffer = "<?php echo 1; ?><![CDATA[<x>]]>".to_string();
        assert_eq!(extract_noise(&mut vault, &mut buffer, false), 2);
        assert!(!buffer.contains('<'));
    }

    #[test]
    fn template_directives_are_opt_in() {
        let mut vault = NoiseVault::new();
        let mut buffer = "<p>{{ name }}</p>".to_string();
        assert_eq!(extract_noise(&mut vault, &mut buffer, false), 0);
        assert_eq!(extract_noise(&mut vault, &mut buffer, true), 0);

        let mut buffer = "<p>{x <b> }</p>".to_string();
        assert_eq!(extract_noise(&mut vault, &mut buffer, true), 1);
        assert!(!buffer.contains("<b>"));
    }
}
