//! Default inline image rule.

use crate::element::Element;
use crate::rule::{InlineContext, InlineRule, RuleMatch};
use crate::token::ImageMatch;

/// Renders `![alt](src "title")` as a plain `<img>`.
///
/// This is the fallback for inline images that no higher-priority rule
/// claims. Reference-style images are left to pulldown-cmark.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRule;

impl ImageRule {
    /// Registry name of this rule.
    pub const NAME: &'static str = "image_link";

    /// Priority of the default image handling.
    pub const PRIORITY: u16 = 150;
}

impl InlineRule for ImageRule {
    fn apply(&self, image: &ImageMatch<'_>, _ctx: &InlineContext<'_>) -> Option<RuleMatch> {
        if !image.is_inline() {
            return None;
        }

        let token = &image.token;
        let mut element = Element::new("img");
        element.set("src", token.src.as_str());
        if let Some(title) = &token.title {
            element.set("title", title.as_str());
        }
        element.set("alt", token.alt.as_str());

        Some(RuleMatch {
            element,
            end: image.end,
        })
    }
}
