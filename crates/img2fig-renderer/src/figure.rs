//! Image-to-figure rewriting.
//!
//! Turns `![alt](src "title")` into
//! `<figure><img src alt><figcaption>title</figcaption></figure>`, choosing
//! either the title or the alt text as the caption.

use std::fmt;
use std::str::FromStr;

use crate::element::Element;
use crate::rule::{InlineContext, InlineRule, RuleMatch};
use crate::token::{ImageMatch, ImageToken};

/// Error raised when building a rewriter from invalid options.
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// An option has a value outside its allowed set.
    #[error("Invalid {option} '{value}': expected \"title\" or \"alt\"")]
    InvalidConfiguration {
        /// Option name (e.g. `source_attr`).
        option: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Image attribute promoted to the figure caption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptionSource {
    /// Use the title: `![alt](src "caption")`.
    #[default]
    Title,
    /// Use the alt text: `![caption](src)`.
    Alt,
}

impl CaptionSource {
    /// Attribute name carrying the caption.
    #[must_use]
    pub fn attr_name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Alt => "alt",
        }
    }

    /// The attribute that is not the caption source.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Title => Self::Alt,
            Self::Alt => Self::Title,
        }
    }
}

impl FromStr for CaptionSource {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "alt" => Ok(Self::Alt),
            _ => Err(RewriteError::InvalidConfiguration {
                option: "source_attr",
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for CaptionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attr_name())
    }
}

/// Options for [`FigureRewriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteConfig {
    /// Which attribute becomes the caption.
    pub caption_source: CaptionSource,
    /// Drop the caption attribute from the `<img>` once it became a caption.
    pub remove_attr: bool,
    /// Produce a `<figure>` even when there is no caption.
    pub force_convert: bool,
    /// Treat an empty caption as a missing one.
    pub empty_as_none: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            caption_source: CaptionSource::Title,
            remove_attr: true,
            force_convert: true,
            empty_as_none: true,
        }
    }
}

impl RewriteConfig {
    /// Build a config from the option names exposed to users.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::InvalidConfiguration`] if `source_attr` is not
    /// `"title"` or `"alt"`.
    pub fn from_options(
        source_attr: &str,
        remove_attr: bool,
        force_convert: bool,
        empty_as_none: bool,
    ) -> Result<Self, RewriteError> {
        Ok(Self {
            caption_source: source_attr.parse()?,
            remove_attr,
            force_convert,
            empty_as_none,
        })
    }

    /// Set the caption source.
    #[must_use]
    pub fn with_caption_source(mut self, source: CaptionSource) -> Self {
        self.caption_source = source;
        self
    }

    /// Set whether the caption attribute is removed from `<img>`.
    #[must_use]
    pub fn with_remove_attr(mut self, enabled: bool) -> Self {
        self.remove_attr = enabled;
        self
    }

    /// Set whether images without a caption are still converted.
    #[must_use]
    pub fn with_force_convert(mut self, enabled: bool) -> Self {
        self.force_convert = enabled;
        self
    }

    /// Set whether an empty caption counts as missing.
    #[must_use]
    pub fn with_empty_as_none(mut self, enabled: bool) -> Self {
        self.empty_as_none = enabled;
        self
    }
}

/// Outcome of a single rewrite attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// A figure replacing the image source up to `end`.
    Figure {
        /// The `<figure>` element.
        element: Element,
        /// Byte index just past the consumed source.
        end: usize,
    },
    /// No caption and conversion is not forced: leave the plain image.
    PlainImage,
    /// Not an inline image (reference-style images are left alone).
    NoMatch,
}

/// Inline rule converting images into captioned figures.
#[derive(Debug, Clone, Copy, Default)]
pub struct FigureRewriter {
    config: RewriteConfig,
}

impl FigureRewriter {
    /// Registry name of this rule.
    pub const NAME: &'static str = "img2fig";

    /// Priority; runs before the default image rule.
    pub const PRIORITY: u16 = 151;

    /// Create a rewriter with the given options.
    #[must_use]
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    /// Options this rewriter was built with.
    #[must_use]
    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Rewrite a recognized image.
    ///
    /// With attribute lists enabled, an annotation directly following the
    /// image is moved into the figure and consumed.
    pub fn rewrite(&self, image: &ImageMatch<'_>, ctx: &InlineContext<'_>) -> Rewrite {
        if !image.is_inline() {
            return Rewrite::NoMatch;
        }

        let Some(mut element) = self.build_figure(&image.token) else {
            return Rewrite::PlainImage;
        };
        let mut end = image.end;

        // Move a trailing annotation inside the figure so that the
        // attribute-list stage binds it to <figure> instead of <img>.
        if let Some(attr_list) = ctx.attr_list
            && let Some(annotation) = attr_list.match_annotation(image.following)
            && let Some(last) = element.children.last_mut()
        {
            last.tail.push('\n');
            last.tail.push_str(annotation);
            end += annotation.len();
        }

        Rewrite::Figure { element, end }
    }

    /// Build the figure, or `None` if the image should stay as is.
    fn build_figure(&self, image: &ImageToken) -> Option<Element> {
        let ImageToken { alt, src, title } = image;
        let source = self.config.caption_source;

        let (mut caption, other) = match source {
            CaptionSource::Title => (title.as_deref(), Some(alt.as_str())),
            CaptionSource::Alt => (Some(alt.as_str()), title.as_deref()),
        };

        if self.config.empty_as_none && caption == Some("") {
            caption = None;
        }

        if caption.is_none() && !self.config.force_convert {
            return None;
        }

        let mut figure = Element::new("figure");
        let img = figure.sub_element("img");
        img.set("src", src.as_str());
        if let Some(other) = other {
            img.set(source.other().attr_name(), other);
        }
        if let Some(caption) = caption
            && !self.config.remove_attr
        {
            img.set(source.attr_name(), caption);
        }

        if let Some(caption) = caption {
            figure.sub_element("figcaption").text = caption.to_owned();
        }

        Some(figure)
    }
}

impl InlineRule for FigureRewriter {
    fn apply(&self, image: &ImageMatch<'_>, ctx: &InlineContext<'_>) -> Option<RuleMatch> {
        match self.rewrite(image, ctx) {
            Rewrite::Figure { element, end } => Some(RuleMatch { element, end }),
            Rewrite::PlainImage | Rewrite::NoMatch => None,
        }
    }
}
