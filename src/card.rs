//! Card composition.
//!
//! [`render`] combines a theme, rendered Markdown, and optional color
//! overrides into a [`CardNode`]: the single element that the export
//! pipeline turns into an image.
//!
//! ```text
//! <div id="card" style="{theme.container}; background:{bg}; color:{text}; ...">
//!   <div class="card-content" style="{theme.content}">
//!     {markdown html, with themed blockquotes / h1 / images}
//!   </div>
//! </div>
//! ```
//!
//! Override colors are appended after the theme's declarations, so they win
//! over the theme's own background and text color. An unset override leaves
//! the theme default in place.

use crate::color::Color;
use crate::i18n::Translator;
use crate::markdown::{ElementRenderer, alert_class, escape, render_markdown};
use crate::theme::{ThemeDescriptor, base_font, get_theme};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::BlockQuoteKind;

/// Element id of the card root inside [`CardNode::document`].
pub const CARD_ELEMENT_ID: &str = "card";

/// Typography for rendered Markdown inside a card. Themes only style the
/// container, blockquotes and h1; everything else inherits from here.
const CARD_CSS: &str = r#"
#card { box-sizing: border-box; overflow-wrap: break-word; }
#card * { box-sizing: border-box; }
.card-content { font-size: 1rem; }
.card-content p { margin: 0 0 1.25em; }
.card-content h1 { margin-top: 0; }
.card-content h2 { font-size: 1.5em; font-weight: 700; line-height: 1.33; margin: 1.5em 0 0.75em; }
.card-content h3 { font-size: 1.25em; font-weight: 600; line-height: 1.6; margin: 1.4em 0 0.6em; }
.card-content h4, .card-content h5, .card-content h6 { font-weight: 600; margin: 1.2em 0 0.5em; }
.card-content a { color: var(--card-link, #2563eb); text-decoration: underline; }
.card-content strong { font-weight: 700; }
.card-content ul, .card-content ol { margin: 0 0 1.25em; padding-left: 1.6em; }
.card-content li { margin: 0.4em 0; }
.card-content blockquote { font-style: italic; }
.card-content blockquote p { margin: 0; }
.card-content code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 0.875em; background: var(--card-code-bg, rgba(127,127,127,0.15)); padding: 0.1em 0.35em; border-radius: 0.25rem; }
.card-content pre { background: #1f2937; color: #e5e7eb; padding: 0.9em 1.1em; border-radius: 0.375rem; overflow-x: auto; margin: 0 0 1.25em; }
.card-content pre code { background: none; padding: 0; font-size: 0.875em; color: inherit; }
.card-content table { width: 100%; border-collapse: collapse; margin: 0 0 1.25em; font-size: 0.875em; }
.card-content th, .card-content td { border-bottom: 1px solid rgba(127,127,127,0.3); padding: 0.5em 0.6em; text-align: left; }
.card-content th { font-weight: 600; }
.card-content hr { border: 0; border-top: 1px solid rgba(127,127,127,0.3); margin: 2em 0; }
.card-content del { opacity: 0.7; }
.card-content :last-child { margin-bottom: 0; }
"#;

/// Element overrides bound to one theme.
pub struct ThemedElements<'t> {
    theme: &'t ThemeDescriptor,
}

impl<'t> ThemedElements<'t> {
    pub fn new(theme: &'t ThemeDescriptor) -> Self {
        Self { theme }
    }
}

impl ElementRenderer for ThemedElements<'_> {
    fn blockquote_open(&self, kind: Option<BlockQuoteKind>) -> String {
        let class = alert_class(kind)
            .map(|class| format!(" class=\"{class}\""))
            .unwrap_or_default();
        format!(
            "<blockquote{class} style=\"{}\">\n",
            escape(self.theme.quote_border)
        )
    }

    fn heading_open(&self) -> String {
        format!("<h1 style=\"{}\">", escape(self.theme.heading))
    }
}

/// A rendered card: the unit handed to the export pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardNode {
    theme: &'static ThemeDescriptor,
    container_style: String,
    content_html: String,
}

impl CardNode {
    pub fn theme(&self) -> &'static ThemeDescriptor {
        self.theme
    }

    /// Inline style of the card root, overrides included.
    pub fn container_style(&self) -> &str {
        &self.container_style
    }

    /// The rendered Markdown inside the card.
    pub fn content_html(&self) -> &str {
        &self.content_html
    }

    /// The card element itself. `background` replaces the card's background
    /// for capture (e.g. `transparent`).
    pub fn markup(&self, background: Option<&str>) -> Markup {
        let style = match background {
            Some(bg) => format!("{};background:{bg}", self.container_style),
            None => self.container_style.clone(),
        };
        html! {
            div id=(CARD_ELEMENT_ID) style=(style) {
                div.card-content style=(self.theme.content) {
                    (PreEscaped(&self.content_html))
                }
            }
        }
    }

    /// Stylesheet the card markup depends on.
    pub fn stylesheet(&self) -> &'static str {
        CARD_CSS
    }

    /// A standalone HTML page containing only the card, on a transparent
    /// page background. This is what the capture backend loads.
    pub fn document(&self, background: Option<&str>) -> String {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8";
                    title { (self.theme.name) }
                    style {
                        (PreEscaped("html, body { margin: 0; padding: 0; background: transparent; }\nbody { display: inline-block; "))
                        (PreEscaped(base_font()))
                        (PreEscaped("; }\n"))
                        (PreEscaped(CARD_CSS))
                    }
                }
                body {
                    (self.markup(background))
                }
            }
        }
        .into_string()
    }
}

/// Build the container style: theme declarations, then overrides, then the
/// centering rules.
fn container_style(
    theme: &ThemeDescriptor,
    background: Option<&Color>,
    text: Option<&Color>,
) -> String {
    let mut style = theme.container.to_string();
    if let Some(bg) = background {
        style.push_str(";background:");
        style.push_str(bg.as_str());
    }
    if let Some(color) = text {
        style.push_str(";color:");
        style.push_str(color.as_str());
    }
    style.push_str(";max-width:100%;margin:0 auto");
    style
}

/// Compose a card from Markdown, a theme id, and optional color overrides.
///
/// An unknown `theme_id` silently renders with the default theme.
pub fn render(
    markdown: &str,
    theme_id: &str,
    background: Option<&Color>,
    text: Option<&Color>,
) -> CardNode {
    let theme = get_theme(theme_id);
    let content_html = render_markdown(markdown, &ThemedElements::new(theme));
    CardNode {
        theme,
        container_style: container_style(theme, background, text),
        content_html,
    }
}

/// The editable card state: text, theme and color overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub markdown: String,
    pub theme: String,
    pub background: Option<Color>,
    pub text: Option<Color>,
}

impl Document {
    /// A document holding `markdown` with the default theme and no overrides.
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            theme: "default".to_string(),
            background: None,
            text: None,
        }
    }

    /// A new document seeded with the locale's sample Markdown.
    pub fn sample(translator: &Translator) -> Self {
        Self::new(translator.default_markdown())
    }

    pub fn render(&self) -> CardNode {
        render(
            &self.markdown,
            &self.theme,
            self.background.as_ref(),
            self.text.as_ref(),
        )
    }
}
