//! Small markup helpers for the rich editing mode.

use regex::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    // Opening tags only; quoted attribute values may contain '>'
    TAG.get_or_init(|| {
        Regex::new(r#"<([A-Za-z][A-Za-z0-9-]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#)
            .expect("tag pattern is valid")
    })
}

fn attribute_regex() -> &'static Regex {
    static ATTR: OnceLock<Regex> = OnceLock::new();
    ATTR.get_or_init(|| {
        Regex::new(r#"\s+([^\s=/>"']+)(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>"']+))?"#)
            .expect("attribute pattern is valid")
    })
}

/// Remove every inline `style` attribute from every element.
///
/// Everything else (tags, other attributes, text) is left untouched.
pub fn strip_inline_styles(html: &str) -> String {
    tag_regex()
        .replace_all(html, |tag: &regex::Captures<'_>| {
            let attributes = attribute_regex().replace_all(&tag[2], |attr: &regex::Captures<'_>| {
                if attr[1].eq_ignore_ascii_case("style") {
                    String::new()
                } else {
                    attr[0].to_string()
                }
            });
            format!("<{}{}>", &tag[1], attributes)
        })
        .into_owned()
}

/// Escape text for insertion into markup
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_style_attribute() {
        assert_eq!(
            strip_inline_styles(r#"<span style="color:red">hi</span>"#),
            "<span>hi</span>"
        );
    }

    #[test]
    fn test_strip_keeps_other_attributes() {
        let html = r#"<p class="x" STYLE='margin: 0' id=a>text</p>"#;
        assert_eq!(strip_inline_styles(html), r#"<p class="x" id=a>text</p>"#);
    }

    #[test]
    fn test_strip_unquoted_and_nested() {
        let html = r#"<div style=color:red><b style="font-weight: 900">x</b></div>"#;
        assert_eq!(strip_inline_styles(html), "<div><b>x</b></div>");
    }

    #[test]
    fn test_strip_ignores_text_mentions() {
        let html = "<p>style=\"keep\" in text</p>";
        assert_eq!(strip_inline_styles(html), html);
    }

    #[test]
    fn test_strip_does_not_touch_data_style() {
        let html = r#"<span data-style="a" style="b">x</span>"#;
        assert_eq!(strip_inline_styles(html), r#"<span data-style="a">x</span>"#);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
