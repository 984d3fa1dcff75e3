//! Per-format serializers: card node + options → encoded [`Payload`].
//!
//! | Format | Backend call | Encoding |
//! |---|---|---|
//! | PNG | `capture_png` | as captured, or flattened for a solid background |
//! | JPEG | `capture_png` | flattened onto the solid background, `JpegEncoder` |
//! | SVG | `measure` | `<svg><foreignObject>` around the card's XHTML |
//!
//! The SVG keeps the card as live markup, so it is only as portable as the
//! HTML inside it: raw HTML from the Markdown source that is not well-formed
//! XML makes the SVG invalid.

use super::backend::{BackendError, CaptureBackend};
use super::format::{Background, ExportConfig, ExportFormat, ExportOptions, Payload, export_options};
use crate::card::CardNode;
use crate::color::Color;
use crate::theme::base_font;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use maud::{PreEscaped, html};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SerializeError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Style override applied to the card root for capture.
fn capture_background(background: &Background) -> Option<&'static str> {
    match background {
        Background::Transparent => Some("transparent"),
        Background::Theme | Background::Solid(_) => None,
    }
}

/// Composite a transparent-canvas capture onto an opaque color.
fn flatten(png: &[u8], background: [u8; 3]) -> Result<RgbImage, SerializeError> {
    let rgba = image::load_from_memory_with_format(png, ImageFormat::Png)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RgbImage::from_fn(width, height, |x, y| {
        let px = rgba.get_pixel(x, y);
        let alpha = u32::from(px[3]);
        let blend = |c: u8, bg: u8| {
            ((u32::from(c) * alpha + u32::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([
            blend(px[0], background[0]),
            blend(px[1], background[1]),
            blend(px[2], background[2]),
        ])
    }))
}

pub fn to_png(
    backend: &dyn CaptureBackend,
    node: &CardNode,
    options: &ExportOptions,
) -> Result<Payload, SerializeError> {
    let document = node.document(capture_background(&options.background));
    let png = backend.capture_png(&document, options.pixel_ratio)?;

    let (bytes, width, height) = match &options.background {
        Background::Solid(color) => {
            let flat = flatten(&png, color.rgb())?;
            let (width, height) = flat.dimensions();
            let mut out = Cursor::new(Vec::new());
            DynamicImage::ImageRgb8(flat).write_to(&mut out, ImageFormat::Png)?;
            (out.into_inner(), width, height)
        }
        Background::Theme | Background::Transparent => {
            let img = image::load_from_memory_with_format(&png, ImageFormat::Png)?;
            (png, img.width(), img.height())
        }
    };

    Ok(Payload {
        format: ExportFormat::Png,
        bytes,
        width,
        height,
    })
}

pub fn to_jpeg(
    backend: &dyn CaptureBackend,
    node: &CardNode,
    options: &ExportOptions,
) -> Result<Payload, SerializeError> {
    let document = node.document(None);
    let png = backend.capture_png(&document, options.pixel_ratio)?;

    let canvas = match &options.background {
        Background::Solid(color) => color.rgb(),
        Background::Theme | Background::Transparent => [255, 255, 255],
    };
    let flat = flatten(&png, canvas)?;
    let (width, height) = flat.dimensions();

    let quality = (options.quality * 100.0).round().clamp(1.0, 100.0) as u8;
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    DynamicImage::ImageRgb8(flat).write_with_encoder(encoder)?;

    Ok(Payload {
        format: ExportFormat::Jpeg,
        bytes,
        width,
        height,
    })
}

pub fn to_svg(
    backend: &dyn CaptureBackend,
    node: &CardNode,
    options: &ExportOptions,
) -> Result<Payload, SerializeError> {
    let dims = backend.measure(&node.document(capture_background(&options.background)))?;
    let (w, h) = (dims.width, dims.height);

    let svg = html! {
        svg xmlns="http://www.w3.org/2000/svg" width=(w) height=(h) viewBox={ "0 0 " (w) " " (h) } {
            @if let Background::Solid(color) = &options.background {
                rect width="100%" height="100%" fill=(color.as_str()) {}
            }
            foreignObject x="0" y="0" width="100%" height="100%" {
                div xmlns="http://www.w3.org/1999/xhtml" style=(base_font()) {
                    style { (PreEscaped(node.stylesheet())) }
                    (node.markup(capture_background(&options.background)))
                }
            }
        }
    }
    .into_string();

    Ok(Payload {
        format: ExportFormat::Svg,
        bytes: svg.into_bytes(),
        width: w,
        height: h,
    })
}

/// Serialize `node` with the handler bound to the configured format.
pub fn serialize(
    backend: &dyn CaptureBackend,
    node: &CardNode,
    config: &ExportConfig,
) -> Result<Payload, SerializeError> {
    let options = export_options(config);
    tracing::debug!(
        format = %config.format,
        quality = options.quality,
        pixel_ratio = options.pixel_ratio,
        background = ?options.background,
        "serializing card"
    );
    let handler = config.format.handler();
    handler(backend, node, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::backend::tests::{MockBackend, RecordedOp};
    use crate::export::format::Scale;
    use crate::test_helpers::{assert_contains, export_config as config, sample_card};

    fn node() -> CardNode {
        sample_card("default")
    }

    fn captured_document(backend: &MockBackend) -> String {
        match backend.get_operations().pop() {
            Some(RecordedOp::Capture { document, .. }) => document,
            Some(RecordedOp::Measure(document)) => document,
            None => panic!("backend was not called"),
        }
    }

    #[test]
    fn png_keeps_transparent_canvas() {
        let backend = MockBackend::new();
        let payload = serialize(&backend, &node(), &config(ExportFormat::Png, false)).unwrap();

        assert_eq!(payload.format, ExportFormat::Png);
        assert_eq!((payload.width, payload.height), (8, 6));
        let img = image::load_from_memory(&payload.bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert!(captured_document(&backend).contains("background:transparent"));
    }

    #[test]
    fn png_with_background_uses_card_background() {
        let backend = MockBackend::new();
        serialize(&backend, &node(), &config(ExportFormat::Png, true)).unwrap();
        assert!(!captured_document(&backend).contains("background:transparent"));
    }

    #[test]
    fn jpeg_flattens_onto_white() {
        let backend = MockBackend {
            card_color: [0, 0, 0, 0],
            ..MockBackend::default()
        };
        let payload = serialize(&backend, &node(), &config(ExportFormat::Jpeg, false)).unwrap();

        assert_eq!(&payload.bytes[..2], &[0xFF, 0xD8]);
        let img = image::load_from_memory(&payload.bytes).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (8, 6));
        for px in img.pixels() {
            assert!(px.0.iter().all(|&c| c > 245), "pixel was {px:?}");
        }
        assert!(!captured_document(&backend).contains("background:transparent"));
    }

    #[test]
    fn jpeg_keeps_dark_card_background() {
        let backend = MockBackend {
            card_color: [30, 30, 30, 255],
            ..MockBackend::default()
        };
        let mut cfg = config(ExportFormat::Jpeg, false);
        cfg.scale = Scale::new(4.0);
        let payload = serialize(&backend, &node(), &cfg).unwrap();

        let img = image::load_from_memory(&payload.bytes).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (32, 24));
        let center = img.get_pixel(16, 12).0;
        assert!(center.iter().all(|&c| c < 60), "card was {center:?}");
        let corner = img.get_pixel(0, 0).0;
        assert!(corner.iter().all(|&c| c > 150), "page was {corner:?}");
    }

    #[test]
    fn flatten_blends_alpha() {
        let mut png = Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 128]))
            .write_to(&mut png, ImageFormat::Png)
            .unwrap();
        let flat = flatten(png.get_ref(), [255, 255, 255]).unwrap();
        assert_eq!(flat.get_pixel(0, 0), &Rgb([127, 127, 127]));
    }

    #[test]
    fn png_solid_background_is_opaque() {
        let backend = MockBackend::new();
        let options = ExportOptions {
            quality: 1.0,
            pixel_ratio: 1.0,
            background: Background::Solid(Color::parse("#000000").unwrap()),
        };
        let payload = to_png(&backend, &node(), &options).unwrap();
        let img = image::load_from_memory(&payload.bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0), &image::Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn svg_wraps_card_markup() {
        let backend = MockBackend::new();
        let payload = serialize(&backend, &node(), &config(ExportFormat::Svg, true)).unwrap();
        let svg = String::from_utf8(payload.bytes).unwrap();

        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="6""#));
        assert_contains(&svg, "<foreignObject");
        assert_contains(&svg, r#"xmlns="http://www.w3.org/1999/xhtml""#);
        assert_contains(&svg, r#"id="card""#);
        assert_contains(&svg, "Card Title</h1>");
        assert!(!svg.contains("<rect"));
        assert_eq!(
            backend.get_operations().len(),
            1,
            "svg only measures, never captures"
        );
    }

    #[test]
    fn svg_without_background_is_transparent() {
        let backend = MockBackend::new();
        let payload = serialize(&backend, &node(), &config(ExportFormat::Svg, false)).unwrap();
        let svg = String::from_utf8(payload.bytes).unwrap();
        assert!(svg.contains("background:transparent"));
    }

    #[test]
    fn pixel_ratio_reaches_backend() {
        let backend = MockBackend::new();
        let mut cfg = config(ExportFormat::Png, true);
        cfg.scale = Scale::new(3.0);
        let payload = serialize(&backend, &node(), &cfg).unwrap();
        assert_eq!((payload.width, payload.height), (24, 18));
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let backend = MockBackend::new();
        for format in ExportFormat::ALL {
            let cfg = config(format, false);
            let first = serialize(&backend, &node(), &cfg).unwrap();
            let second = serialize(&backend, &node(), &cfg).unwrap();
            assert_eq!(first.bytes, second.bytes, "{format} is not deterministic");
        }
    }

    #[test]
    fn backend_failure_propagates() {
        let backend = MockBackend::failing("no browser");
        let err = serialize(&backend, &node(), &config(ExportFormat::Png, true)).unwrap_err();
        assert!(matches!(err, SerializeError::Backend(_)));
    }
}
