//! CLI output formatting.
//!
//! All user-facing text goes through the active [`Translator`], so the CLI
//! speaks the same language as the card's sample text.
//!
//! # Output Format
//!
//! ## Themes
//!
//! ```text
//! Themes
//! 001 default (Default) 600px
//! 002 modern (Modern) 600px
//! ...
//! ```
//!
//! ## Export
//!
//! ```text
//! Card exported as PNG: out/markdown-card-2025-01-01.png
//!     PNG • 2x • 95%
//!     Best for most uses, supports transparency
//!     1200 × 904 px, 48213 bytes
//!     sha256: 3f1c...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::color::PRESET_COLORS;
use crate::export::{ExportConfig, ExportFormat, Payload};
use crate::i18n::{Locale, Translator};
use crate::theme::{THEMES, ThemeId};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// The `width:` declaration of a container style, if any.
fn card_width(container: &str) -> Option<&str> {
    container
        .split(';')
        .find_map(|decl| decl.trim().strip_prefix("width:"))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// `PNG • 2x • 95%`, the settings line shown under previews and exports.
fn settings_line(t: &Translator, config: &ExportConfig) -> String {
    let format = config.format.to_string();
    let scale = config.scale.to_string();
    let quality = config.quality.value().to_string();
    t.t_with(
        "export.previewReady",
        &[("format", &format), ("scale", &scale), ("quality", &quality)],
    )
}

fn payload_lines(payload: &Payload) -> Vec<String> {
    vec![
        format!(
            "{}{} × {} px, {} bytes",
            indent(1),
            payload.width,
            payload.height,
            payload.bytes.len()
        ),
        format!("{}sha256: {}", indent(1), payload.digest()),
    ]
}

// ============================================================================
// Listings
// ============================================================================

pub fn format_themes(t: &Translator, current: Option<ThemeId>) -> Vec<String> {
    let mut lines = vec![t.t("themes.heading")];
    for (i, theme) in THEMES.iter().enumerate() {
        let marker = if Some(theme.id) == current { " *" } else { "" };
        let width = card_width(theme.container).unwrap_or("auto");
        lines.push(format!(
            "{} {} ({}) {}{}",
            format_index(i + 1),
            theme.id,
            theme.name,
            width,
            marker
        ));
    }
    lines
}

pub fn print_themes(t: &Translator, current: Option<ThemeId>) {
    print_lines(&format_themes(t, current));
}

pub fn format_colors(t: &Translator) -> Vec<String> {
    let mut lines = vec![t.t("colors.heading")];
    for (i, color) in PRESET_COLORS.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), color));
    }
    lines
}

pub fn print_colors(t: &Translator) {
    print_lines(&format_colors(t));
}

/// The active language, then every supported locale by id and name.
pub fn format_languages(t: &Translator) -> Vec<String> {
    let current = t.language_name(t.locale());
    let mut lines = vec![t.t_with("lang.current", &[("name", &current)])];
    for locale in Locale::ALL {
        let marker = if locale == t.locale() { " *" } else { "" };
        lines.push(format!(
            "{}{} {}{}",
            indent(1),
            locale,
            t.language_name(locale),
            marker
        ));
    }
    lines
}

pub fn print_languages(t: &Translator) {
    print_lines(&format_languages(t));
}

pub fn format_language_changed(t: &Translator) -> String {
    let name = t.language_name(t.locale());
    t.t_with("lang.changed", &[("name", &name)])
}

// ============================================================================
// Card and export results
// ============================================================================

pub fn format_card_written(t: &Translator, path: &Path) -> String {
    let path = path.display().to_string();
    t.t_with("card.written", &[("path", &path)])
}

/// Warning shown when a transparent JPEG was requested.
pub fn format_jpeg_notice(t: &Translator, config: &ExportConfig) -> Option<String> {
    (config.format == ExportFormat::Jpeg && !config.include_background)
        .then(|| t.t("export.jpegNoTransparency"))
}

pub fn format_export_summary(
    t: &Translator,
    path: &Path,
    payload: &Payload,
    config: &ExportConfig,
) -> Vec<String> {
    let format = payload.format.to_string();
    let path = path.display().to_string();
    let mut lines = vec![
        t.t_with("export.exported", &[("format", &format), ("path", &path)]),
        format!("{}{}", indent(1), settings_line(t, config)),
        format!(
            "{}{}",
            indent(1),
            t.t(payload.format.spec().description_key)
        ),
    ];
    lines.extend(payload_lines(payload));
    lines
}

pub fn print_export_summary(t: &Translator, path: &Path, payload: &Payload, config: &ExportConfig) {
    print_lines(&format_export_summary(t, path, payload, config));
}

/// Preview report. With `data_uri`, the last line is the payload as a
/// `data:` URI, ready to paste into a browser.
pub fn format_preview(
    t: &Translator,
    payload: &Payload,
    config: &ExportConfig,
    data_uri: bool,
) -> Vec<String> {
    let mut lines = vec![
        t.t("card.preview"),
        format!("{}{}", indent(1), settings_line(t, config)),
        format!("{}{}", indent(1), t.t("export.previewNote")),
    ];
    lines.extend(payload_lines(payload));
    if data_uri {
        lines.push(payload.data_uri());
    }
    lines
}

pub fn print_preview(t: &Translator, payload: &Payload, config: &ExportConfig, data_uri: bool) {
    print_lines(&format_preview(t, payload, config, data_uri));
}

pub fn format_copied(t: &Translator, payload: &Payload) -> Vec<String> {
    let mut lines = vec![t.t("export.copied")];
    lines.extend(payload_lines(payload));
    lines
}

pub fn print_copied(t: &Translator, payload: &Payload) {
    print_lines(&format_copied(t, payload));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{export_config as config, fake_payload};

    fn en() -> Translator {
        Translator::new(Locale::En)
    }

    fn payload() -> Payload {
        fake_payload(ExportFormat::Png, 1200, 904)
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(14), "014");
    }

    #[test]
    fn card_width_extracts_declaration() {
        assert_eq!(card_width("padding:2rem;width:600px;color:red"), Some("600px"));
        assert_eq!(card_width("max-width:600px"), None);
    }

    #[test]
    fn themes_listing() {
        let lines = format_themes(&en(), Some(ThemeId::Social));
        assert_eq!(lines[0], "Themes");
        assert_eq!(lines.len(), 15);
        assert_eq!(lines[1], "001 default (Default) 600px");
        let social = lines.iter().find(|l| l.contains("social")).unwrap();
        assert!(social.contains("400px"));
        assert!(social.ends_with(" *"));
    }

    #[test]
    fn colors_listing() {
        let lines = format_colors(&en());
        assert_eq!(lines[0], "Preset colors");
        assert_eq!(lines[1], "001 #000000");
        assert_eq!(lines.len(), 21);
    }

    #[test]
    fn languages_listing_in_japanese() {
        let lines = format_languages(&Translator::new(Locale::Ja));
        assert!(lines[0].contains("日本語"));
        assert!(lines.iter().any(|l| l.trim() == "ja 日本語 *"));
        assert!(lines.iter().any(|l| l.trim() == "en English"));
    }

    #[test]
    fn language_changed_message() {
        assert_eq!(
            format_language_changed(&Translator::new(Locale::En)),
            "Language set to English"
        );
    }

    #[test]
    fn jpeg_notice_only_for_transparent_jpeg() {
        let t = en();
        assert!(format_jpeg_notice(&t, &config(ExportFormat::Jpeg, false)).is_some());
        assert!(format_jpeg_notice(&t, &config(ExportFormat::Jpeg, true)).is_none());
        assert!(format_jpeg_notice(&t, &config(ExportFormat::Png, false)).is_none());
    }

    #[test]
    fn export_summary() {
        let lines = format_export_summary(
            &en(),
            Path::new("out/card.png"),
            &payload(),
            &config(ExportFormat::Png, true),
        );
        assert_eq!(lines[0], "Card exported as PNG: out/card.png");
        assert_eq!(lines[1], "    PNG • 1x • 95%");
        assert_eq!(lines[2], "    Best for most uses, supports transparency");
        assert_eq!(lines[3], "    1200 × 904 px, 10 bytes");
        assert!(lines[4].starts_with("    sha256: "));
    }

    #[test]
    fn preview_with_data_uri() {
        let lines = format_preview(&en(), &payload(), &config(ExportFormat::Png, true), true);
        assert_eq!(lines[0], "Card Preview");
        assert!(lines.last().unwrap().starts_with("data:image/png;base64,"));

        let lines = format_preview(&en(), &payload(), &config(ExportFormat::Png, true), false);
        assert!(!lines.iter().any(|l| l.starts_with("data:")));
    }

    #[test]
    fn copied_message() {
        let lines = format_copied(&en(), &payload());
        assert_eq!(lines[0], "Image copied to clipboard");
    }
}
