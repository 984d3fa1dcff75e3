//! # markcard
//!
//! Markdown to themed card images. Write Markdown, pick a card theme,
//! optionally override the background and text colors, and export the card
//! as PNG, JPEG or SVG for sharing.
//!
//! # Architecture
//!
//! ```text
//! Markdown ──► markdown::render_markdown ──┐
//!                                          ├─► card::render ─► CardNode
//! theme id ──► theme::get_theme ───────────┘                     │
//!                                                                ▼
//!                         export::ExportDialog (preview / download / copy)
//!                                                                │
//!                          CaptureBackend (headless Chromium) ◄──┤
//!                                                                ▼
//!                                         Payload ─► file / clipboard / data URI
//! ```
//!
//! All user-facing strings come from [`i18n`], in English, Chinese or
//! Japanese.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`i18n`] | Locale tables, key-path resolution with English fallback, locale selection |
//! | [`prefs`] | Persistent key-value preferences (the chosen language) |
//! | [`theme`] | The fixed registry of fourteen card themes |
//! | [`color`] | Validated background/text color overrides and the preset palette |
//! | [`markdown`] | Markdown → HTML with themeable blockquote, heading and image elements |
//! | [`card`] | Card composition: theme + Markdown + overrides → [`card::CardNode`] |
//! | [`export`] | Formats, capture backend, serializers, clipboard, dialog state machine |
//! | [`config`] | `markcard.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Soft Fallbacks
//!
//! An unknown theme id renders with the default theme, and a translation key
//! missing from every table renders as the key itself. Neither is an error:
//! a card should always render, and a missing string should be visible
//! rather than blank. Configuration is stricter and rejects unknown themes
//! up front.
//!
//! ## A Real Browser for Pixels
//!
//! Cards are HTML and CSS (gradients, shadows, web fonts), so raster export
//! lays them out in headless Chromium and screenshots the card element.
//! Everything before that point (Markdown, theming, composition) and after it
//! (JPEG encoding, flattening, SVG assembly) is plain Rust, and the browser
//! sits behind [`export::CaptureBackend`] so tests run without one.
//!
//! ## Stale Results Are Discarded, Not Cancelled
//!
//! Export requests carry a [`export::RequestToken`]. Closing the dialog or
//! starting a newer request makes older tokens stale; their results are
//! dropped when they arrive instead of overwriting newer state.

pub mod card;
pub mod color;
pub mod config;
pub mod export;
pub mod i18n;
pub mod markdown;
pub mod output;
pub mod prefs;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_helpers;
