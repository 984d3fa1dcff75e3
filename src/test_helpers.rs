//! Shared test utilities.
//!
//! Card fixtures and export settings used across the export and output
//! tests, so each test states only what it varies.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let node = sample_card("ocean");
//! let config = export_config(ExportFormat::Jpeg, false);
//! ```

use crate::card::{CardNode, render};
use crate::export::{ExportConfig, ExportFormat, Payload, Quality, Scale};

/// Markdown exercising every element a theme can style.
pub const SAMPLE_MARKDOWN: &str = "\
# Card Title

Some **bold** text and a link to https://example.com.

> A quoted line.

![logo](logo.png)
";

/// [`SAMPLE_MARKDOWN`] rendered with `theme` and no color overrides.
pub fn sample_card(theme: &str) -> CardNode {
    render(SAMPLE_MARKDOWN, theme, None, None)
}

/// Export settings with quality 95, scale 1 and base name `card`.
pub fn export_config(format: ExportFormat, include_background: bool) -> ExportConfig {
    ExportConfig {
        format,
        quality: Quality::new(95),
        scale: Scale::new(1.0),
        include_background,
        file_name: "card".to_string(),
    }
}

/// A payload with placeholder bytes.
pub fn fake_payload(format: ExportFormat, width: u32, height: u32) -> Payload {
    Payload {
        format,
        bytes: vec![0; 10],
        width,
        height,
    }
}

// =========================================================================
// Assertion helpers
// =========================================================================

/// Assert `html` contains `needle`, showing the HTML on failure.
pub fn assert_contains(html: &str, needle: &str) {
    assert!(
        html.contains(needle),
        "expected to find {needle:?} in:\n{html}"
    );
}
