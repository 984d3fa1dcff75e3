//! Export formats, settings and the encoded result.
//!
//! ## Types
//!
//! - [`ExportFormat`]: PNG, JPEG or SVG, each with a fixed [`FormatSpec`] and serializer.
//! - [`Quality`]: Lossy encoding quality (50–100, default 95). Clamped on construction.
//! - [`Scale`]: Device pixel ratio (1.0–4.0 in 0.5 steps, default 2.0). Snapped on construction.
//! - [`ExportConfig`]: What the user picked in the export dialog.
//! - [`ExportOptions`]: What the serializer receives, derived by [`export_options`].
//! - [`Payload`]: An encoded image.

use super::backend::CaptureBackend;
use super::serialize::{self, SerializeError};
use crate::card::CardNode;
use crate::color::Color;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    #[value(alias = "jpg")]
    Jpeg,
    Svg,
}

/// Static description of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub id: ExportFormat,
    pub name: &'static str,
    /// Translation key of the one-line description.
    pub description_key: &'static str,
    pub media_type: &'static str,
    pub extension: &'static str,
}

const FORMATS: [FormatSpec; 3] = [
    FormatSpec {
        id: ExportFormat::Png,
        name: "PNG",
        description_key: "export.formats.png",
        media_type: "image/png",
        extension: "png",
    },
    FormatSpec {
        id: ExportFormat::Jpeg,
        name: "JPEG",
        description_key: "export.formats.jpeg",
        media_type: "image/jpeg",
        extension: "jpg",
    },
    FormatSpec {
        id: ExportFormat::Svg,
        name: "SVG",
        description_key: "export.formats.svg",
        media_type: "image/svg+xml",
        extension: "svg",
    },
];

/// Serializer signature shared by every format.
pub type Handler =
    fn(&dyn CaptureBackend, &CardNode, &ExportOptions) -> Result<Payload, SerializeError>;

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Svg];

    pub fn spec(self) -> &'static FormatSpec {
        match self {
            ExportFormat::Png => &FORMATS[0],
            ExportFormat::Jpeg => &FORMATS[1],
            ExportFormat::Svg => &FORMATS[2],
        }
    }

    /// The serializer bound to this format.
    pub fn handler(self) -> Handler {
        match self {
            ExportFormat::Png => serialize::to_png,
            ExportFormat::Jpeg => serialize::to_jpeg,
            ExportFormat::Svg => serialize::to_svg,
        }
    }

    /// Whether the encoded image can carry transparency.
    pub fn supports_transparency(self) -> bool {
        !matches!(self, ExportFormat::Jpeg)
    }

    pub fn is_raster(self) -> bool {
        !matches!(self, ExportFormat::Svg)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

/// Quality setting for lossy encoding (50-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 50;
    pub const MAX: u8 = 100;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN as u32, Self::MAX as u32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Quality on the 0–1 scale serializers take.
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Pixel ratio of the capture (1.0-4.0, in 0.5 steps).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(f32);

impl Scale {
    pub const MIN: f32 = 1.0;
    pub const MAX: f32 = 4.0;

    /// Snap to the nearest half step inside the allowed range.
    pub fn new(value: f32) -> Self {
        let value = if value.is_finite() { value } else { 2.0 };
        Self(((value * 2.0).round() / 2.0).clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(2.0)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Base file name used when none is configured: `markdown-card-YYYY-MM-DD`.
pub fn default_file_name() -> String {
    format!("markdown-card-{}", chrono::Local::now().format("%Y-%m-%d"))
}

/// The choices made in the export dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub quality: Quality,
    pub scale: Scale,
    pub include_background: bool,
    /// Base name without extension.
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            quality: Quality::default(),
            scale: Scale::default(),
            include_background: true,
            file_name: default_file_name(),
        }
    }
}

/// What sits behind the card in the exported image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// The card's own (theme or override) background.
    Theme,
    /// No background: the card is captured on a transparent canvas.
    Transparent,
    /// The card is flattened onto an opaque color.
    Solid(Color),
}

/// Serializer input derived from an [`ExportConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// 0–1.
    pub quality: f32,
    pub pixel_ratio: f32,
    pub background: Background,
}

/// Build serializer options from the dialog settings.
///
/// JPEG has no alpha channel. The card keeps its theme background and the
/// transparent page around it (rounded corners, shadows) is flattened onto
/// white, whatever `include_background` says.
pub fn export_options(config: &ExportConfig) -> ExportOptions {
    let background = if !config.format.supports_transparency() {
        Background::Solid(Color::white())
    } else if config.include_background {
        Background::Theme
    } else {
        Background::Transparent
    };
    ExportOptions {
        quality: config.quality.fraction(),
        pixel_ratio: config.scale.value(),
        background,
    }
}

/// An encoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    /// Pixel size of the encoded image (CSS size for SVG).
    pub width: u32,
    pub height: u32,
}

impl Payload {
    pub fn media_type(&self) -> &'static str {
        self.format.spec().media_type
    }

    /// `data:<media type>;base64,...`, for inline display.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type(), STANDARD.encode(&self.bytes))
    }

    /// `<base>.<extension>`.
    pub fn file_name(&self, base: &str) -> String {
        format!("{base}.{}", self.format.spec().extension)
    }

    /// Hex SHA-256 of the encoded bytes.
    pub fn digest(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}
