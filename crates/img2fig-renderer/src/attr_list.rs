//! Attribute-list annotations: `{: #id .class key="value"}`.
//!
//! Provides the [`AttributeListSupport`] capability: a grammar matcher used by
//! inline rules to recognize a trailing annotation, and a tree stage that binds
//! annotations to the elements they follow.

use std::sync::LazyLock;

use regex::Regex;

use crate::element::Element;

/// Annotation at the start of an inline element's tail.
static INLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{:?[ ]*([^}\n ][^}\n]*?)[ ]*\}").unwrap());

/// Annotation on its own last line of a block element's text.
static BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ ]*\{:?[ ]*([^}\n ][^}\n]*?)[ ]*\}[ ]*$").unwrap());

/// Optional pipeline capability for attribute-list annotations.
///
/// When present in the [`InlineContext`](crate::InlineContext), rules may use
/// [`match_annotation`](Self::match_annotation) to claim an annotation that
/// belongs to the element they produce.
pub trait AttributeListSupport: Send + Sync {
    /// Match an annotation at the very start of `text`.
    ///
    /// Returns the raw matched annotation, including braces.
    fn match_annotation<'t>(&self, text: &'t str) -> Option<&'t str>;

    /// Bind annotations to elements in the fragment below `root`.
    ///
    /// The root itself is a container and never receives attributes.
    fn apply(&self, root: &mut Element);
}

/// Default attribute-list implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttrList;

impl AttrList {
    /// Create the attribute-list stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit(&self, elem: &mut Element) {
        if elem.is_block_level() {
            if let Some(last) = elem.children.last_mut() {
                if let Some((start, attrs)) = block_annotation(&last.tail) {
                    last.tail.truncate(start);
                    assign_attrs(elem, &attrs);
                }
            } else if let Some((start, attrs)) = block_annotation(&elem.text) {
                elem.text.truncate(start);
                assign_attrs(elem, &attrs);
            }
        } else if let Some((end, attrs)) = inline_annotation(&elem.tail) {
            elem.tail.replace_range(..end, "");
            assign_attrs(elem, &attrs);
        }

        for child in &mut elem.children {
            self.visit(child);
        }
    }
}

impl AttributeListSupport for AttrList {
    fn match_annotation<'t>(&self, text: &'t str) -> Option<&'t str> {
        INLINE_RE.find(text).map(|m| m.as_str())
    }

    fn apply(&self, root: &mut Element) {
        for child in &mut root.children {
            self.visit(child);
        }
    }
}

/// Find a leading inline annotation. Returns (match end, attribute string).
fn inline_annotation(text: &str) -> Option<(usize, String)> {
    let caps = INLINE_RE.captures(text)?;
    let end = caps.get(0)?.end();
    Some((end, caps[1].to_owned()))
}

/// Find a trailing block annotation. Returns (match start, attribute string).
fn block_annotation(text: &str) -> Option<(usize, String)> {
    let caps = BLOCK_RE.captures(text)?;
    let start = caps.get(0)?.start();
    Some((start, caps[1].to_owned()))
}

/// Single item of an attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrItem {
    Id(String),
    Class(String),
    Pair(String, String),
}

/// Parse an attribute list body: `#id .class key="value" key='v' key=v`.
fn parse_attrs(attrs_str: &str) -> Vec<AttrItem> {
    let mut items = Vec::new();
    let mut remaining = attrs_str.trim();

    while !remaining.is_empty() {
        remaining = remaining.trim_start();

        if let Some(rest) = remaining.strip_prefix('#') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                .unwrap_or(rest.len());
            if end > 0 {
                items.push(AttrItem::Id(rest[..end].to_owned()));
            }
            remaining = &rest[end..];
        } else if let Some(rest) = remaining.strip_prefix('.') {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '.' || c == '#')
                .unwrap_or(rest.len());
            if end > 0 {
                items.push(AttrItem::Class(rest[..end].to_owned()));
            }
            remaining = &rest[end..];
        } else if let Some((key, value, rest)) = parse_key_value(remaining) {
            if is_valid_name(key) {
                items.push(AttrItem::Pair(key.to_owned(), value.to_owned()));
            }
            remaining = rest;
        } else {
            // Skip unrecognized character
            let skip = remaining.chars().next().map_or(1, char::len_utf8);
            remaining = &remaining[skip..];
        }
    }

    items
}

/// Parse `key="value"`, `key='value'` or `key=value` at the start of `s`.
fn parse_key_value(s: &str) -> Option<(&str, &str, &str)> {
    let key_end = s.find(|c: char| c == '=' || c.is_whitespace())?;
    if !s[key_end..].starts_with('=') {
        return None;
    }
    let key = &s[..key_end];
    if key.is_empty() {
        return None;
    }

    let after_eq = &s[key_end + 1..];

    if let Some(stripped) = after_eq.strip_prefix('"') {
        let end_quote = stripped.find('"')?;
        Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]))
    } else if let Some(stripped) = after_eq.strip_prefix('\'') {
        let end_quote = stripped.find('\'')?;
        Some((key, &stripped[..end_quote], &stripped[end_quote + 1..]))
    } else {
        let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
        Some((key, &after_eq[..end], &after_eq[end..]))
    }
}

/// Attribute names must start with a letter, `_` or `:`.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

/// Apply an attribute list body to an element.
fn assign_attrs(elem: &mut Element, attrs_str: &str) {
    for item in parse_attrs(attrs_str) {
        match item {
            AttrItem::Id(id) => elem.set("id", id),
            AttrItem::Class(class) => {
                let merged = match elem.get("class") {
                    Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
                    _ => class,
                };
                elem.set("class", merged);
            }
            AttrItem::Pair(key, value) => elem.set(&key, value),
        }
    }
}
