//! Export pipeline: card node → PNG, JPEG or SVG.
//!
//! | Stage | Module |
//! |---|---|
//! | **Settings** | [`format`]: formats, quality, scale, [`export_options`] |
//! | **Layout and capture** | [`backend`] trait, [`chrome_backend`] (headless Chromium) |
//! | **Encoding** | [`serialize`]: one serializer per format |
//! | **Clipboard** | [`clipboard`]: [`ClipboardSink`], `arboard` |
//! | **Dialog state** | [`session`]: state machine and request tokens |
//! | **Dialog** | [`dialog`]: async preview / download / copy |
//!
//! The only format-specific rule outside the serializers: JPEG cannot carry
//! transparency, so its options always ask for an opaque white background.

pub mod backend;
pub mod chrome_backend;
pub mod clipboard;
pub mod dialog;
pub mod format;
pub mod serialize;
pub mod session;

pub use backend::{BackendError, CaptureBackend, Dimensions};
pub use chrome_backend::ChromeBackend;
pub use clipboard::{ArboardClipboard, ClipboardError, ClipboardSink, copy_markdown};
pub use dialog::{ExportDialog, ExportError};
pub use format::{
    Background, ExportConfig, ExportFormat, ExportOptions, FormatSpec, Payload, Quality, Scale,
    default_file_name, export_options,
};
pub use serialize::{SerializeError, serialize};
pub use session::{ExportAction, ExportSession, ExportState, RequestToken, Resolution};
