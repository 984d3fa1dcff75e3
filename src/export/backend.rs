//! Capture backend trait and shared types.
//!
//! A [`CaptureBackend`] lays out a standalone card document (see
//! [`CardNode::document`](crate::card::CardNode::document)) and reports on
//! the card element: its CSS size, or a PNG screenshot of it.
//!
//! The production implementation is
//! [`ChromeBackend`](super::chrome_backend::ChromeBackend), which drives a
//! headless Chromium over the DevTools protocol.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("browser unavailable: {0}")]
    Unavailable(String),
    #[error("capture failed: {0}")]
    CaptureFailed(String),
}

/// Size of the card element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Renders card documents.
///
/// Implementations must be deterministic: the same document and pixel ratio
/// produce the same bytes.
pub trait CaptureBackend: Send + Sync {
    /// Lay out `document` and measure the card element.
    fn measure(&self, document: &str) -> Result<Dimensions, BackendError>;

    /// Screenshot the card element as PNG at `pixel_ratio` device pixels per
    /// CSS pixel. The canvas behind the card is transparent.
    fn capture_png(&self, document: &str, pixel_ratio: f32) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Mock backend that records operations and paints a fixed image.
    ///
    /// Captures are `size * pixel_ratio` pixels: an opaque card color inside
    /// a one-pixel transparent border, so tests can tell the canvas from the
    /// card after encoding.
    pub struct MockBackend {
        pub size: Dimensions,
        pub card_color: [u8; 4],
        pub fail_with: Mutex<Option<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Measure(String),
        Capture { document: String, pixel_ratio: f32 },
    }

    impl Default for MockBackend {
        fn default() -> Self {
            Self {
                size: Dimensions {
                    width: 8,
                    height: 6,
                },
                card_color: [200, 40, 40, 255],
                fail_with: Mutex::new(None),
                operations: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(message: &str) -> Self {
            let backend = Self::default();
            *backend.fail_with.lock().unwrap() = Some(message.to_string());
            backend
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn check_failure(&self) -> Result<(), BackendError> {
            match self.fail_with.lock().unwrap().clone() {
                Some(message) => Err(BackendError::CaptureFailed(message)),
                None => Ok(()),
            }
        }
    }

    impl CaptureBackend for MockBackend {
        fn measure(&self, document: &str) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Measure(document.to_string()));
            self.check_failure()?;
            Ok(self.size)
        }

        fn capture_png(&self, document: &str, pixel_ratio: f32) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Capture {
                document: document.to_string(),
                pixel_ratio,
            });
            self.check_failure()?;

            let width = (self.size.width as f32 * pixel_ratio).round() as u32;
            let height = (self.size.height as f32 * pixel_ratio).round() as u32;
            let img = RgbaImage::from_fn(width, height, |x, y| {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    Rgba([0, 0, 0, 0])
                } else {
                    Rgba(self.card_color)
                }
            });
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, ImageFormat::Png)
                .map_err(|e| BackendError::CaptureFailed(e.to_string()))?;
            Ok(out.into_inner())
        }
    }

    #[test]
    fn mock_records_measure() {
        let backend = MockBackend::new();
        let dims = backend.measure("<html></html>").unwrap();
        assert_eq!(dims, Dimensions { width: 8, height: 6 });

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Measure(d) if d == "<html></html>"));
    }

    #[test]
    fn mock_capture_scales_with_pixel_ratio() {
        let backend = MockBackend::new();
        let png = backend.capture_png("doc", 2.0).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (16, 12));

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Capture {
                document: "doc".to_string(),
                pixel_ratio: 2.0
            }]
        );
    }

    #[test]
    fn mock_capture_is_deterministic() {
        let backend = MockBackend::new();
        assert_eq!(
            backend.capture_png("doc", 1.5).unwrap(),
            backend.capture_png("doc", 1.5).unwrap()
        );
    }

    #[test]
    fn failing_mock_reports_error() {
        let backend = MockBackend::failing("boom");
        let err = backend.capture_png("doc", 1.0).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
