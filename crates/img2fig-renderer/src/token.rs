//! Image tokens built from pulldown-cmark image events.

use pulldown_cmark::{Event, LinkType};

/// Image reference as recognized by the markdown parser.
///
/// Alt text, destination and title are already unescaped and have their
/// entity references decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageToken {
    /// Plain-text alt content.
    pub alt: String,
    /// Image destination.
    pub src: String,
    /// Title, if the source gave one (possibly empty).
    pub title: Option<String>,
}

/// An image handed to inline rules, with its position in the source.
#[derive(Debug, Clone)]
pub struct ImageMatch<'s> {
    /// Parsed image data.
    pub token: ImageToken,
    /// How the image destination was written.
    pub link_type: LinkType,
    /// Byte offset of the leading `!`.
    pub start: usize,
    /// Byte offset just past the image syntax.
    pub end: usize,
    /// Literal source text directly after the image, up to the next
    /// non-text event. Rules may consume a prefix of it.
    pub following: &'s str,
}

impl ImageMatch<'_> {
    /// Whether the image uses inline `(src "title")` syntax.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.link_type == LinkType::Inline
    }
}

/// Plain text of the events between an image's start and end tags.
pub(crate) fn collect_alt<'e, 'a: 'e>(events: impl Iterator<Item = &'e Event<'a>>) -> String {
    let mut alt = String::new();
    for event in events {
        match event {
            Event::Text(text)
            | Event::Code(text)
            | Event::InlineHtml(text)
            | Event::InlineMath(text)
            | Event::DisplayMath(text) => alt.push_str(text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        }
    }
    alt
}

/// Title of an inline image.
///
/// The parser reports a missing title and an empty one the same way, so an
/// empty title is told apart by looking for `""`, `''` or `()` before the
/// closing parenthesis of the raw image syntax.
pub(crate) fn resolve_title(title: &str, raw: &str) -> Option<String> {
    if !title.is_empty() {
        return Some(title.to_owned());
    }
    has_empty_title(raw).then(String::new)
}

fn has_empty_title(raw: &str) -> bool {
    let Some(inner) = raw.strip_suffix(')') else {
        return false;
    };
    let inner = inner.trim_end();
    ["\"\"", "''", "()"].iter().any(|quotes| {
        inner
            .strip_suffix(quotes)
            .is_some_and(|rest| rest.ends_with(char::is_whitespace))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pulldown_cmark::CowStr;

    #[test]
    fn test_resolve_title() {
        assert_eq!(resolve_title("Cap", r#"![a](a.png "Cap")"#), Some("Cap".to_owned()));
        assert_eq!(resolve_title("", "![a](a.png)"), None);
        assert_eq!(resolve_title("", r#"![a](a.png "")"#), Some(String::new()));
        assert_eq!(resolve_title("", "![a](a.png '' )"), Some(String::new()));
        assert_eq!(resolve_title("", "![a](<a b.png> ())"), Some(String::new()));
    }

    #[test]
    fn test_quotes_in_destination_are_not_a_title() {
        assert_eq!(resolve_title("", r#"![a](a.png"")"#), None);
        assert_eq!(resolve_title("", "![a](f())"), None);
        assert_eq!(resolve_title("", r#"![""](a.png)"#), None);
    }

    #[test]
    fn test_collect_alt() {
        let events = [
            Event::Text(CowStr::Borrowed("Tom ")),
            Event::Text(CowStr::Borrowed("&")),
            Event::SoftBreak,
            Event::Code(CowStr::Borrowed("Jerry")),
        ];
        assert_eq!(collect_alt(events.iter()), "Tom & Jerry");
    }
}
