//! Prioritized inline rule pipeline over pulldown-cmark events.
//!
//! Images recognized by the parser are offered to registered
//! [`InlineRule`]s. A produced element goes through the optional
//! attribute-list stage and replaces the image's events with a single inline
//! HTML event. Everything else passes through untouched, so code blocks, code
//! spans and raw HTML never reach the rules.

use std::ops::Range;

use pulldown_cmark::{CowStr, Event, Tag};

use crate::attr_list::AttributeListSupport;
use crate::element::Element;
use crate::image::ImageRule;
use crate::rule::{InlineContext, InlineRule, RuleMatch};
use crate::token::{ImageMatch, ImageToken, collect_alt, resolve_title};

/// Parser event with its byte range in the source.
pub type OffsetEvent<'a> = (Event<'a>, Range<usize>);

struct RegisteredRule {
    name: String,
    priority: u16,
    rule: Box<dyn InlineRule>,
}

/// Events after inline rules ran, ready for an HTML writer.
#[derive(Debug)]
pub struct ProcessedEvents<'a> {
    /// Rewritten event stream.
    pub events: Vec<Event<'a>>,
    produced: Vec<String>,
}

impl ProcessedEvents<'_> {
    /// Number of produced elements with the given tag.
    #[must_use]
    pub fn count(&self, tag: &str) -> usize {
        self.produced.iter().filter(|t| *t == tag).count()
    }
}

/// Ordered collection of inline rules plus optional tree stages.
///
/// Rules are tried from highest to lowest priority. Rules with equal priority
/// keep their registration order.
///
/// # Example
///
/// ```
/// use img2fig_renderer::{FigureRewriter, InlinePipeline, RewriteConfig};
/// use pulldown_cmark::Parser;
///
/// let mut pipeline = InlinePipeline::with_defaults();
/// pipeline.register(
///     FigureRewriter::NAME,
///     FigureRewriter::PRIORITY,
///     FigureRewriter::new(RewriteConfig::default()),
/// );
///
/// let markdown = r#"![a](a.png "Caption")"#;
/// let processed = pipeline.process(markdown, Parser::new(markdown).into_offset_iter());
/// let mut html = String::new();
/// pulldown_cmark::html::push_html(&mut html, processed.events.into_iter());
/// assert!(html.starts_with("<p><figure>"));
/// ```
#[derive(Default)]
pub struct InlinePipeline {
    rules: Vec<RegisteredRule>,
    attr_list: Option<Box<dyn AttributeListSupport>>,
}

impl InlinePipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with the default image rule registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut pipeline = Self::new();
        pipeline.register(ImageRule::NAME, ImageRule::PRIORITY, ImageRule);
        pipeline
    }

    /// Register a rule under `name`, replacing any rule with the same name.
    pub fn register<R: InlineRule + 'static>(&mut self, name: &str, priority: u16, rule: R) {
        self.deregister(name);
        let index = self
            .rules
            .iter()
            .position(|r| r.priority < priority)
            .unwrap_or(self.rules.len());
        self.rules.insert(
            index,
            RegisteredRule {
                name: name.to_owned(),
                priority,
                rule: Box::new(rule),
            },
        );
    }

    /// Remove the rule registered under `name`. Returns whether one existed.
    pub fn deregister(&mut self, name: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.name != name);
        self.rules.len() != before
    }

    /// Rule names in the order they are tried.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.iter().map(|r| r.name.as_str())
    }

    /// Enable the attribute-list stage.
    pub fn set_attr_list<A: AttributeListSupport + 'static>(&mut self, support: A) {
        self.attr_list = Some(Box::new(support));
    }

    /// Check whether the attribute-list stage is enabled.
    #[must_use]
    pub fn has_attr_list(&self) -> bool {
        self.attr_list.is_some()
    }

    /// Capabilities handed to rules.
    #[must_use]
    pub fn context(&self) -> InlineContext<'_> {
        InlineContext {
            attr_list: self.attr_list.as_deref(),
        }
    }

    /// Run the rules over parser events of `source`.
    ///
    /// `events` must come from `Parser::into_offset_iter` over the same
    /// `source`. Images that no rule claims keep their original events.
    pub fn process<'a, I>(&self, source: &'a str, events: I) -> ProcessedEvents<'a>
    where
        I: IntoIterator<Item = OffsetEvent<'a>>,
    {
        let events: Vec<OffsetEvent<'a>> = events.into_iter().collect();
        let ctx = self.context();
        let mut out = Vec::with_capacity(events.len());
        let mut produced = Vec::new();
        let mut index = 0;

        while index < events.len() {
            let (event, range) = &events[index];
            let Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                ..
            }) = event
            else {
                out.push(event.clone());
                index += 1;
                continue;
            };

            let close = image_end(&events, index);
            let image = ImageMatch {
                token: ImageToken {
                    alt: collect_alt(events[index + 1..close].iter().map(|(e, _)| e)),
                    src: dest_url.to_string(),
                    title: resolve_title(title, &source[range.clone()]),
                },
                link_type: *link_type,
                start: range.start,
                end: range.end,
                following: literal_text_after(source, &events[close + 1..], range.end),
            };

            match self.match_image(&image, &ctx) {
                Some(found) => {
                    let (element, end) = self.bind_attributes(found, &image);
                    out.push(Event::InlineHtml(CowStr::from(element.to_html())));
                    produced.push(element.tag);
                    index = skip_consumed(source, &events, close + 1, end, &mut out);
                }
                None => {
                    out.extend(events[index..=close].iter().map(|(e, _)| e.clone()));
                    index = close + 1;
                }
            }
        }

        ProcessedEvents {
            events: out,
            produced,
        }
    }

    fn match_image(&self, image: &ImageMatch<'_>, ctx: &InlineContext<'_>) -> Option<RuleMatch> {
        let consumable = |m: &RuleMatch| {
            m.end >= image.end && image.following.get(..m.end - image.end).is_some()
        };

        for registered in &self.rules {
            let found = registered.rule.apply(image, ctx).filter(consumable);
            if let Some(found) = found {
                tracing::debug!(
                    rule = %registered.name,
                    start = image.start,
                    end = found.end,
                    tag = %found.element.tag,
                    "Inline rule matched"
                );
                return Some(found);
            }
        }

        None
    }

    /// Run the attribute-list stage on a produced element.
    ///
    /// An annotation directly after the consumed source is offered to the
    /// element as its tail. Returns the element and the final consumed end.
    fn bind_attributes(&self, found: RuleMatch, image: &ImageMatch<'_>) -> (Element, usize) {
        let RuleMatch { element, end } = found;
        let Some(attr_list) = &self.attr_list else {
            return (element, end);
        };

        let rest = &image.following[end - image.end..];
        let pending = attr_list.match_annotation(rest).unwrap_or_default();

        let mut root = Element::new("");
        root.children.push(element.with_tail(pending));
        attr_list.apply(&mut root);

        let mut element = root.children.pop().unwrap_or_default();
        let consumed = if element.tail.is_empty() {
            pending.len()
        } else {
            0
        };
        element.tail.clear();
        (element, end + consumed)
    }
}

/// Index of the end event matching the start event at `start`.
fn image_end(events: &[OffsetEvent<'_>], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, (event, _)) in events[start + 1..].iter().enumerate() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return start + 1 + offset,
            Event::End(_) => depth -= 1,
            _ => {}
        }
    }
    events.len() - 1
}

/// Source text from `start` covered by consecutive text events whose content
/// is the literal source (no escapes or entity references).
fn literal_text_after<'a>(source: &'a str, events: &[OffsetEvent<'_>], start: usize) -> &'a str {
    let mut end = start;
    for (event, range) in events {
        match event {
            Event::Text(text) if range.start == end && **text == source[range.clone()] => {
                end = range.end;
            }
            _ => break,
        }
    }
    &source[start..end]
}

/// Drop text events before `end`, starting at `index`, and re-emit the rest
/// of a partially consumed one. Returns the next unprocessed index.
fn skip_consumed<'a>(
    source: &'a str,
    events: &[OffsetEvent<'a>],
    mut index: usize,
    end: usize,
    out: &mut Vec<Event<'a>>,
) -> usize {
    while let Some((Event::Text(_), range)) = events.get(index) {
        if range.start >= end {
            break;
        }
        index += 1;
        if range.end > end {
            out.push(Event::Text(CowStr::Borrowed(&source[end..range.end])));
            break;
        }
    }
    index
}
