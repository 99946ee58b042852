//! Element tree produced by inline rules.
//!
//! Mirrors the text/tail model of an XML tree: `text` is the content before
//! the first child, `tail` is the content after the element's closing tag.

use std::fmt::Write;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that the attribute-list stage treats as blocks.
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "td",
    "th",
    "ul",
];

/// Node in an inline element tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Element tag name.
    pub tag: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: String,
    /// Text after the element.
    pub tail: String,
    /// Child elements.
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element with the given tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set tail content.
    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((key.to_owned(), value)),
        }
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Append a child with the given tag and return it for further setup.
    pub fn sub_element(&mut self, tag: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Whether the attribute-list stage treats this element as a block.
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        BLOCK_ELEMENTS.contains(&self.tag.as_str())
    }

    /// Whether this element has no closing tag.
    #[must_use]
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    /// Serialize this element (without its own tail) to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_open_and_content(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        self.write_open_and_content(out);
        out.push_str(&escape_html(&self.tail));
    }

    fn write_open_and_content(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attrs {
            let _ = write!(out, r#" {key}="{}""#, escape_attr(value));
        }
        out.push('>');

        if self.is_void() {
            return;
        }

        out.push_str(&escape_html(&self.text));
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Escape text content for HTML.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for a double-quoted HTML attribute.
fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_void_element() {
        let mut img = Element::new("img");
        img.set("src", "cat.png");
        img.set("alt", "a cat");
        assert_eq!(img.to_html(), r#"<img src="cat.png" alt="a cat">"#);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut el = Element::new("div");
        el.set("id", "a");
        el.set("class", "x");
        el.set("id", "b");
        assert_eq!(
            el.attrs,
            vec![
                ("id".to_owned(), "b".to_owned()),
                ("class".to_owned(), "x".to_owned())
            ]
        );
    }

    #[test]
    fn test_nested_with_text_and_tail() {
        let mut figure = Element::new("figure");
        figure.sub_element("img").set("src", "a.png");
        figure.sub_element("figcaption").text = "Caption".to_owned();
        figure.tail = " ignored".to_owned();

        assert_eq!(
            figure.to_html(),
            r#"<figure><img src="a.png"><figcaption>Caption</figcaption></figure>"#
        );
    }

    #[test]
    fn test_child_tail_is_serialized() {
        let mut p = Element::new("p").with_text("a ");
        p.children.push(Element::new("em").with_text("b").with_tail(" c"));
        assert_eq!(p.to_html(), "<p>a <em>b</em> c</p>");
    }

    #[test]
    fn test_escaping() {
        let mut img = Element::new("img");
        img.set("alt", r#"say "hi" & <bye>"#);
        assert_eq!(
            img.to_html(),
            r#"<img alt="say &quot;hi&quot; &amp; &lt;bye&gt;">"#
        );

        let caption = Element::new("figcaption").with_text("1 < 2 & 3");
        assert_eq!(
            caption.to_html(),
            "<figcaption>1 &lt; 2 &amp; 3</figcaption>"
        );
    }

    #[test]
    fn test_block_level() {
        assert!(Element::new("figure").is_block_level());
        assert!(Element::new("p").is_block_level());
        assert!(!Element::new("img").is_block_level());
        assert!(!Element::new("em").is_block_level());
    }

    #[test]
    fn test_get() {
        let mut el = Element::new("img");
        el.set("src", "x.png");
        assert_eq!(el.get("src"), Some("x.png"));
        assert_eq!(el.get("alt"), None);
    }
}
