// Markdown-lite for Text components
//
// The protocol defines exactly one inline rule: `**bold**` spans. Text is
// split on `\*\*(.*?)\*\*`; captured groups become emphasized spans, the
// segments between them stay plain, ordering and whitespace preserved.
// Anything richer (headings, lists, links) is not part of the protocol and
// renders literally.

use super::node::TextSpan;
use regex::Regex;
use std::sync::OnceLock;

fn bold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid static pattern"))
}

/// Split a property string into plain and emphasized spans.
///
/// Empty segments (leading `**`, back-to-back markers) are dropped; they
/// carry no visible text.
pub fn split_bold(text: &str) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for capture in bold_pattern().captures_iter(text) {
        let whole = capture.get(0).expect("match always has group 0");
        let inner = capture.get(1).expect("pattern always captures group 1");

        if whole.start() > cursor {
            spans.push(TextSpan::plain(&text[cursor..whole.start()]));
        }
        if !inner.as_str().is_empty() {
            spans.push(TextSpan::bold(inner.as_str()));
        }
        cursor = whole.end();
    }

    if cursor < text.len() {
        spans.push(TextSpan::plain(&text[cursor..]));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_bold_then_plain() {
        let spans = split_bold("**Open** now");
        assert_eq!(spans, vec![TextSpan::bold("Open"), TextSpan::plain(" now")]);
    }

    #[test]
    fn test_plain_only() {
        let spans = split_bold("no markup here");
        assert_eq!(spans, vec![TextSpan::plain("no markup here")]);
    }

    #[test]
    fn test_interleaved_spans_preserve_whitespace() {
        let spans = split_bold("a **b** c **d**");
        assert_eq!(
            spans,
            vec![
                TextSpan::plain("a "),
                TextSpan::bold("b"),
                TextSpan::plain(" c "),
                TextSpan::bold("d"),
            ]
        );
    }

    #[test]
    fn test_unterminated_marker_stays_literal() {
        let spans = split_bold("half **bold");
        assert_eq!(spans, vec![TextSpan::plain("half **bold")]);
    }

    #[test]
    fn test_empty_bold_is_dropped() {
        let spans = split_bold("a ****b");
        assert_eq!(spans, vec![TextSpan::plain("a "), TextSpan::plain("b")]);
    }

    #[test]
    fn test_empty_string() {
        assert!(split_bold("").is_empty());
    }
}
