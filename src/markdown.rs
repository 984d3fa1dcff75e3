//! Markdown to HTML with element overrides.
//!
//! Parsing and HTML emission are pulldown-cmark's. This module only rewrites
//! the event stream in between:
//!
//! - **Overrides**: the opening tags of blockquotes and top-level headings, and
//!   whole images, come from an [`ElementRenderer`] so a card theme can skin
//!   them. Everything else uses pulldown-cmark's default HTML.
//! - **Autolinks**: bare `http://`, `https://` and `www.` URLs and email
//!   addresses in running text become links, as on GitHub. Detection is
//!   `linkify`'s. Text inside Markdown links, raw `<a>` elements and code is
//!   left alone.
//!
//! Tables, strikethrough, task lists, footnotes and GitHub alert blockquotes
//! (`> [!NOTE]`) are enabled. Raw HTML in the source passes through unchanged.
//!
//! Void elements are emitted self-closed (`<img ... />`) so output without
//! raw HTML is also well-formed XHTML, which the SVG export relies on.

use linkify::{LinkFinder, LinkKind, Span};
use maud::html;
use pulldown_cmark::{
    BlockQuoteKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
    TextMergeStream, html as md_html,
};

/// Inline style that keeps images inside the card and centered.
pub const IMAGE_STYLE: &str = "max-width:100%;height:auto;display:block;margin:1rem auto";

/// Escape text for use in HTML content or a double-quoted attribute.
pub fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Renders the elements a card theme can override.
pub trait ElementRenderer {
    /// Opening tag for a blockquote, e.g. `<blockquote style="...">`.
    /// Alert blockquotes carry the class from [`alert_class`].
    fn blockquote_open(&self, kind: Option<BlockQuoteKind>) -> String {
        match alert_class(kind) {
            Some(class) => format!("<blockquote class=\"{class}\">\n"),
            None => "<blockquote>\n".to_string(),
        }
    }

    /// Opening tag for a level-1 heading.
    fn heading_open(&self) -> String {
        "<h1>".to_string()
    }

    /// A complete image element.
    fn image(&self, src: &str, alt: &str, title: &str) -> String {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(" title=\"{}\"", escape(title))
        };
        format!(
            "<img src=\"{}\" alt=\"{}\"{} style=\"{}\" />",
            escape(src),
            escape(alt),
            title_attr,
            IMAGE_STYLE
        )
    }
}

/// CSS class of a GitHub alert blockquote (`> [!WARNING]`).
pub fn alert_class(kind: Option<BlockQuoteKind>) -> Option<&'static str> {
    Some(match kind? {
        BlockQuoteKind::Note => "markdown-alert-note",
        BlockQuoteKind::Tip => "markdown-alert-tip",
        BlockQuoteKind::Important => "markdown-alert-important",
        BlockQuoteKind::Warning => "markdown-alert-warning",
        BlockQuoteKind::Caution => "markdown-alert-caution",
    })
}

/// Renderer with no theme: default blockquote and heading tags.
pub struct PlainElements;

impl ElementRenderer for PlainElements {}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

/// Render Markdown to an HTML fragment, routing overridable elements
/// through `elements`.
pub fn render_markdown(markdown: &str, elements: &dyn ElementRenderer) -> String {
    let parser = TextMergeStream::new(Parser::new_ext(markdown, parser_options()));
    let events = apply_overrides(autolink(parser), elements);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    md_html::push_html(&mut out, events.into_iter());
    out
}

fn apply_overrides<'a>(
    events: Vec<Event<'a>>,
    elements: &dyn ElementRenderer,
) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::BlockQuote(kind)) => {
                out.push(Event::Html(elements.blockquote_open(kind).into()));
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                out.push(Event::Html("</blockquote>\n".into()));
            }
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) => {
                out.push(Event::Html(elements.heading_open().into()));
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) => {
                out.push(Event::Html("</h1>\n".into()));
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                // Alt text is every text event up to the matching end tag.
                let mut alt = String::new();
                let mut depth = 0usize;
                for inner in iter.by_ref() {
                    match inner {
                        Event::Start(Tag::Image { .. }) => depth += 1,
                        Event::End(TagEnd::Image) if depth == 0 => break,
                        Event::End(TagEnd::Image) => depth -= 1,
                        Event::Text(text) | Event::Code(text) => alt.push_str(&text),
                        _ => {}
                    }
                }
                out.push(Event::InlineHtml(
                    elements.image(&dest_url, &alt, &title).into(),
                ));
            }
            other => out.push(other),
        }
    }
    out
}

fn autolink<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let finder = link_finder();
    let mut out = Vec::new();
    let mut link_depth = 0usize;
    let mut raw_anchor_depth = 0usize;
    let mut in_code_block = false;

    for event in events {
        match event {
            Event::Start(Tag::Link { .. }) | Event::Start(Tag::Image { .. }) => {
                link_depth += 1;
                out.push(event);
            }
            Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                link_depth = link_depth.saturating_sub(1);
                out.push(event);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                out.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                out.push(event);
            }
            Event::Html(ref html) | Event::InlineHtml(ref html) => {
                let (opens, closes) = count_anchor_tags(html);
                raw_anchor_depth = (raw_anchor_depth + opens).saturating_sub(closes);
                out.push(event);
            }
            Event::Text(text) if link_depth == 0 && raw_anchor_depth == 0 && !in_code_block => {
                link_text(&finder, text, &mut out);
            }
            other => out.push(other),
        }
    }
    out
}

/// Finds web URLs (with or without a scheme) and email addresses.
fn link_finder() -> LinkFinder {
    let mut finder = LinkFinder::new();
    finder
        .kinds(&[LinkKind::Url, LinkKind::Email])
        .url_must_have_scheme(false);
    finder
}

/// Number of `<a ...>` opening and `</a>` closing tags in a raw HTML chunk.
fn count_anchor_tags(html: &str) -> (usize, usize) {
    let lower = html.to_ascii_lowercase();
    let is_tag_end = |rest: &str| rest.starts_with(|c: char| c == '>' || c.is_ascii_whitespace());

    let opens = lower
        .match_indices("<a")
        .filter(|(i, tag)| is_tag_end(&lower[i + tag.len()..]))
        .count();
    let closes = lower
        .match_indices("</a")
        .filter(|(i, tag)| is_tag_end(&lower[i + tag.len()..]))
        .count();
    (opens, closes)
}

/// Link target for a span found by [`link_finder`], or `None` when the span
/// is not something GitHub would autolink (`example.com`, `ftp://...`).
fn link_target(span: &Span<'_>) -> Option<String> {
    let text = span.as_str();
    match span.kind()? {
        LinkKind::Email => Some(format!("mailto:{text}")),
        LinkKind::Url if text.starts_with("https://") || text.starts_with("http://") => {
            Some(text.to_string())
        }
        LinkKind::Url if text.starts_with("www.") => Some(format!("http://{text}")),
        _ => None,
    }
}

/// Split a text run into plain text and link events.
fn link_text<'a>(finder: &LinkFinder, text: CowStr<'a>, out: &mut Vec<Event<'a>>) {
    let links: Vec<(usize, usize, String)> = finder
        .spans(&text)
        .filter_map(|span| link_target(&span).map(|dest| (span.start(), span.end(), dest)))
        .collect();
    if links.is_empty() {
        out.push(Event::Text(text));
        return;
    }

    let mut cursor = 0;
    for (start, end, dest) in links {
        if start > cursor {
            out.push(Event::Text(text[cursor..start].to_string().into()));
        }
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: dest.into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(text[start..end].to_string().into()));
        out.push(Event::End(TagEnd::Link));
        cursor = end;
    }
    if cursor < text.len() {
        out.push(Event::Text(text[cursor..].to_string().into()));
    }
}
