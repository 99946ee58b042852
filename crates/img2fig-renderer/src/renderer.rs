//! Markdown renderer with the inline pipeline in front of pulldown-cmark.

use pulldown_cmark::{Options, Parser};

use crate::attr_list::{AttrList, AttributeListSupport};
use crate::figure::{FigureRewriter, RewriteConfig};
use crate::pipeline::InlinePipeline;
use crate::rule::InlineRule;

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Number of `<figure>` elements produced.
    pub figures: usize,
    /// Number of plain `<img>` elements produced by the default image rule.
    pub images: usize,
}

/// Markdown to HTML renderer.
///
/// Inline rules rewrite the images pulldown-cmark recognizes; everything else
/// is rendered by pulldown-cmark itself.
///
/// # Example
///
/// ```
/// use img2fig_renderer::{MarkdownRenderer, RewriteConfig};
///
/// let renderer = MarkdownRenderer::new()
///     .with_figures(RewriteConfig::default())
///     .with_attr_list();
/// let result = renderer.render(r#"![a cat](cat.png "A cat"){: .framed}"#);
///
/// assert_eq!(
///     result.html,
///     "<p><figure class=\"framed\"><img src=\"cat.png\" alt=\"a cat\">\
///      <figcaption>A cat</figcaption></figure></p>\n"
/// );
/// ```
pub struct MarkdownRenderer {
    pipeline: InlinePipeline,
    gfm: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with the default image rule and GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipeline: InlinePipeline::with_defaults(),
            gfm: true,
        }
    }

    /// Convert images into captioned figures.
    #[must_use]
    pub fn with_figures(mut self, config: RewriteConfig) -> Self {
        self.pipeline.register(
            FigureRewriter::NAME,
            FigureRewriter::PRIORITY,
            FigureRewriter::new(config),
        );
        self
    }

    /// Enable `{: ...}` attribute-list annotations.
    #[must_use]
    pub fn with_attr_list(self) -> Self {
        self.with_attr_list_support(AttrList::new())
    }

    /// Enable attribute lists with a custom implementation.
    #[must_use]
    pub fn with_attr_list_support<A: AttributeListSupport + 'static>(mut self, support: A) -> Self {
        self.pipeline.set_attr_list(support);
        self
    }

    /// Register an additional inline rule.
    #[must_use]
    pub fn with_rule<R: InlineRule + 'static>(mut self, name: &str, priority: u16, rule: R) -> Self {
        self.pipeline.register(name, priority, rule);
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// The inline pipeline run over parser events.
    #[must_use]
    pub fn pipeline(&self) -> &InlinePipeline {
        &self.pipeline
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Render markdown to HTML.
    pub fn render(&self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, self.parser_options()).into_offset_iter();
        let processed = self.pipeline.process(markdown, parser);

        let figures = processed.count("figure");
        let images = processed.count("img");
        let mut html = String::with_capacity(markdown.len() + markdown.len() / 2);
        pulldown_cmark::html::push_html(&mut html, processed.events.into_iter());

        tracing::debug!(figures, images, bytes = html.len(), "Rendered markdown");

        RenderResult {
            html,
            figures,
            images,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
