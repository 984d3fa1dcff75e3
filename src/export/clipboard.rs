//! Platform clipboard.
//!
//! [`ClipboardSink`] accepts encoded bytes tagged with their media type.
//! [`ArboardClipboard`] hands raster images to the OS as RGBA pixels, and SVG
//! and plain text as text, since desktop clipboards have no portable slot
//! for SVG images.
//!
//! On Linux (X11 and Wayland) the clipboard is served by the process that
//! set it, and the contents vanish when that process exits. There, each
//! write is owned by a background thread that keeps serving it until another
//! program takes the clipboard, and a short-lived caller such as the CLI
//! must call [`ArboardClipboard::wait_until_replaced`] before exiting.

use image::ImageFormat;
use std::borrow::Cow;
use std::sync::{Mutex, PoisonError};
use std::thread::JoinHandle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("unsupported media type for clipboard: {0}")]
    UnsupportedMediaType(String),
    #[error("cannot decode image for clipboard: {0}")]
    Decode(#[from] image::ImageError),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

/// Something that can receive an encoded image or text.
pub trait ClipboardSink: Send + Sync {
    fn write(&self, media_type: &str, bytes: &[u8]) -> Result<(), ClipboardError>;
}

/// Put Markdown source on the clipboard as plain text.
pub fn copy_markdown(sink: &dyn ClipboardSink, markdown: &str) -> Result<(), ClipboardError> {
    sink.write("text/plain", markdown.as_bytes())
}

/// What a payload becomes on the system clipboard.
#[derive(Debug)]
pub enum ClipboardContent {
    Text(String),
    Image(arboard::ImageData<'static>),
}

/// Convert encoded bytes into clipboard content. Raster images are decoded
/// to RGBA; SVG and plain text are copied as text.
pub fn clipboard_content(media_type: &str, bytes: &[u8]) -> Result<ClipboardContent, ClipboardError> {
    let format = match media_type {
        "image/svg+xml" | "text/plain" => {
            return Ok(ClipboardContent::Text(
                String::from_utf8_lossy(bytes).into_owned(),
            ));
        }
        "image/png" => ImageFormat::Png,
        "image/jpeg" => ImageFormat::Jpeg,
        other => return Err(ClipboardError::UnsupportedMediaType(other.to_string())),
    };
    let rgba = image::load_from_memory_with_format(bytes, format)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ClipboardContent::Image(arboard::ImageData {
        width: width as usize,
        height: height as usize,
        bytes: Cow::Owned(rgba.into_raw()),
    }))
}

/// The system clipboard via `arboard`.
#[derive(Debug, Default)]
pub struct ArboardClipboard {
    /// Threads still serving a write (Linux only).
    owners: Mutex<Vec<JoinHandle<()>>>,
}

impl ArboardClipboard {
    /// Check once that the system clipboard can be opened. `None` when no clipboard can be
    /// opened (e.g. no display server).
    pub fn detect() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(_) => Some(Self::default()),
            Err(e) => {
                tracing::warn!("Clipboard not available: {}", e);
                None
            }
        }
    }

    /// Whether writes are still being served by this process.
    pub fn is_serving(&self) -> bool {
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|owner| !owner.is_finished())
    }

    /// Block until every write has been replaced by another program's
    /// clipboard contents. Returns at once where the OS keeps clipboard
    /// data after the writer exits.
    pub fn wait_until_replaced(&self) {
        let owners = std::mem::take(&mut *self.owners.lock().unwrap_or_else(PoisonError::into_inner));
        for owner in owners {
            if owner.join().is_err() {
                tracing::warn!("clipboard owner thread panicked");
            }
        }
    }

    #[cfg(target_os = "linux")]
    fn set(&self, content: ClipboardContent) -> Result<(), ClipboardError> {
        use arboard::SetExtLinux;

        // Fail early when there is no display; the owner thread can only log.
        arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        let owner = std::thread::spawn(move || {
            let result = arboard::Clipboard::new().and_then(|mut clipboard| {
                let set = clipboard.set().wait();
                match content {
                    ClipboardContent::Text(text) => set.text(text),
                    ClipboardContent::Image(image) => set.image(image),
                }
            });
            match result {
                Ok(()) => tracing::debug!("clipboard contents replaced by another program"),
                Err(e) => tracing::warn!(error = %e, "clipboard write failed"),
            }
        });
        self.owners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(owner);
        Ok(())
    }

    #[cfg(not(target_os = "linux"))]
    fn set(&self, content: ClipboardContent) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        let result = match content {
            ClipboardContent::Text(text) => clipboard.set_text(text),
            ClipboardContent::Image(image) => clipboard.set_image(image),
        };
        result.map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

impl ClipboardSink for ArboardClipboard {
    fn write(&self, media_type: &str, bytes: &[u8]) -> Result<(), ClipboardError> {
        let content = clipboard_content(media_type, bytes)?;
        self.set(content)?;
        tracing::debug!(media_type, size = bytes.len(), "copied to clipboard");
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Records writes instead of touching the system clipboard.
    #[derive(Default)]
    pub struct MemoryClipboard {
        pub fail: bool,
        pub writes: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl ClipboardSink for MemoryClipboard {
        fn write(&self, media_type: &str, bytes: &[u8]) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Write("permission denied".to_string()));
            }
            self.writes
                .lock()
                .unwrap()
                .push((media_type.to_string(), bytes.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn memory_clipboard_records_writes() {
        let clipboard = MemoryClipboard::default();
        clipboard.write("image/png", &[1, 2, 3]).unwrap();
        let writes = clipboard.writes.lock().unwrap();
        assert_eq!(writes.as_slice(), &[("image/png".to_string(), vec![1, 2, 3])]);
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 40]))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn raster_payloads_become_rgba_images() {
        let ClipboardContent::Image(image) = clipboard_content("image/png", &png(3, 2)).unwrap()
        else {
            panic!("expected an image");
        };
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.bytes.len(), 3 * 2 * 4);
        assert_eq!(&image.bytes[..4], &[10, 20, 30, 40]);
    }

    #[test]
    fn svg_and_text_become_text() {
        for media_type in ["image/svg+xml", "text/plain"] {
            let content = clipboard_content(media_type, b"<svg/>").unwrap();
            assert!(matches!(content, ClipboardContent::Text(ref t) if t == "<svg/>"));
        }
    }

    #[test]
    fn unknown_media_type_is_rejected() {
        assert!(matches!(
            clipboard_content("application/pdf", b""),
            Err(ClipboardError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            clipboard_content("image/png", b"not a png"),
            Err(ClipboardError::Decode(_))
        ));
    }

    #[test]
    fn idle_clipboard_does_not_block() {
        let clipboard = ArboardClipboard::default();
        assert!(!clipboard.is_serving());
        clipboard.wait_until_replaced();
    }

    #[test]
    fn owner_threads_are_joined_before_returning() {
        let clipboard = ArboardClipboard::default();
        let (tx, rx) = std::sync::mpsc::channel();
        clipboard
            .owners
            .lock()
            .unwrap()
            .push(std::thread::spawn(move || rx.recv().unwrap()));
        assert!(clipboard.is_serving());

        tx.send(()).unwrap();
        clipboard.wait_until_replaced();
        assert!(!clipboard.is_serving());
        assert!(clipboard.owners.lock().unwrap().is_empty());
    }

    #[test]
    fn markdown_is_copied_as_plain_text() {
        let clipboard = MemoryClipboard::default();
        copy_markdown(&clipboard, "# Title").unwrap();
        let writes = clipboard.writes.lock().unwrap();
        assert_eq!(writes[0], ("text/plain".to_string(), b"# Title".to_vec()));
    }

    #[test]
    fn failure_is_reported() {
        let clipboard = MemoryClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(matches!(
            clipboard.write("image/png", &[]),
            Err(ClipboardError::Write(_))
        ));
    }
}
