//! Inline rule trait.
//!
//! Inline rules receive the images recognized by the markdown parser and may
//! replace each one with an [`Element`].

use crate::attr_list::AttributeListSupport;
use crate::element::Element;
use crate::token::ImageMatch;

/// Capabilities of the running pipeline, passed to every rule invocation.
#[derive(Clone, Copy, Default)]
pub struct InlineContext<'a> {
    /// Attribute-list support, if that stage is enabled.
    pub attr_list: Option<&'a dyn AttributeListSupport>,
}

/// Element produced by a rule, with the end of the consumed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Replacement element.
    pub element: Element,
    /// Byte offset just past the consumed source. At least the image end;
    /// anything beyond it must come from [`ImageMatch::following`].
    pub end: usize,
}

/// Handler for images such as `![alt](src "title")`.
///
/// Rules are registered in an [`InlinePipeline`](crate::InlinePipeline) with a
/// priority. For each image the pipeline tries rules from highest to lowest
/// priority; the first one to return a match wins. Images no rule claims are
/// rendered by pulldown-cmark.
///
/// # Example
///
/// ```
/// use img2fig_renderer::{Element, ImageMatch, InlineContext, InlineRule, RuleMatch};
///
/// struct LazyImage;
///
/// impl InlineRule for LazyImage {
///     fn apply(&self, image: &ImageMatch<'_>, _ctx: &InlineContext<'_>) -> Option<RuleMatch> {
///         let mut element = Element::new("img");
///         element.set("src", image.token.src.as_str());
///         element.set("alt", image.token.alt.as_str());
///         element.set("loading", "lazy");
///         Some(RuleMatch { element, end: image.end })
///     }
/// }
/// ```
pub trait InlineRule: Send + Sync {
    /// Try to handle `image`. Returning `None` defers to lower-priority rules.
    fn apply(&self, image: &ImageMatch<'_>, ctx: &InlineContext<'_>) -> Option<RuleMatch>;
}
