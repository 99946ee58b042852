//! Markdown renderer that turns captioned images into `<figure>` elements.
//!
//! The central piece is [`FigureRewriter`], an inline rule that rewrites
//!
//! ```markdown
//! ![a cat](cat.png "A cat")
//! ```
//!
//! into
//!
//! ```html
//! <figure><img src="cat.png" alt="a cat"><figcaption>A cat</figcaption></figure>
//! ```
//!
//! # Architecture
//!
//! Rendering runs in three phases:
//!
//! 1. **Parsing**: pulldown-cmark turns the markdown into offset events.
//! 2. **Inline rules** ([`InlinePipeline`]): each inline image is offered as an
//!    [`ImageMatch`] to prioritized [`InlineRule`]s. A match becomes an
//!    [`Element`] tree, goes through the optional [`AttributeListSupport`]
//!    stage and replaces the image events with inline HTML.
//! 3. **Writing**: pulldown-cmark's HTML writer renders the rewritten events.
//!
//! Code blocks, code spans and raw HTML never produce image events, so their
//! content is left alone.
//!
//! # Example
//!
//! ```
//! use img2fig_renderer::{CaptionSource, MarkdownRenderer, RewriteConfig};
//!
//! let config = RewriteConfig::default().with_caption_source(CaptionSource::Alt);
//! let result = MarkdownRenderer::new()
//!     .with_figures(config)
//!     .render("![A cat](cat.png)");
//!
//! assert!(result.html.contains("<figcaption>A cat</figcaption>"));
//! ```

mod attr_list;
mod element;
mod figure;
mod image;
mod pipeline;
mod renderer;
mod rule;
mod token;

pub use attr_list::{AttrList, AttributeListSupport};
pub use element::{Element, escape_html};
pub use figure::{CaptionSource, FigureRewriter, Rewrite, RewriteConfig, RewriteError};
pub use image::ImageRule;
pub use pipeline::{InlinePipeline, OffsetEvent, ProcessedEvents};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use rule::{InlineContext, InlineRule, RuleMatch};
pub use token::{ImageMatch, ImageToken};
