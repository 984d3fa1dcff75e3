//! The export dialog: preview, download and copy on top of an
//! [`ExportSession`].
//!
//! Serialization runs on tokio's blocking pool. The session lock is only
//! held for short synchronous sections, never across an `.await`, so the
//! dialog can be closed while a request is in flight. Such a request still
//! runs to completion; its result is then discarded.
//!
//! Every operation returns `Ok(None)` when its result was discarded.
//! Downloads go to a hidden `.<name>.part` file that is renamed into place
//! only while the request is still current, so a discarded download leaves
//! nothing behind.

use super::backend::CaptureBackend;
use super::clipboard::{ClipboardError, ClipboardSink};
use super::format::{ExportConfig, Payload, default_file_name};
use super::serialize::{SerializeError, serialize};
use super::session::{ExportAction, ExportSession, ExportState, RequestToken, Resolution};
use crate::card::CardNode;
use crate::i18n::Translator;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error("no clipboard available")]
    ClipboardUnavailable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub struct ExportDialog {
    backend: Arc<dyn CaptureBackend>,
    clipboard: Option<Arc<dyn ClipboardSink>>,
    translator: Translator,
    session: Mutex<ExportSession>,
    config: Mutex<ExportConfig>,
}

impl ExportDialog {
    /// A closed dialog with default settings. `clipboard` is the result of
    /// capability detection; without one, copying is refused.
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        clipboard: Option<Arc<dyn ClipboardSink>>,
        translator: Translator,
    ) -> Self {
        Self {
            backend,
            clipboard,
            translator,
            session: Mutex::new(ExportSession::new()),
            config: Mutex::new(ExportConfig::default()),
        }
    }

    pub fn with_config(self, config: ExportConfig) -> Self {
        self.set_config(config);
        self
    }

    fn session(&self) -> MutexGuard<'_, ExportSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> ExportConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_config(&self, config: ExportConfig) {
        *self.config.lock().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn clipboard_available(&self) -> bool {
        self.clipboard.is_some()
    }

    pub fn state(&self) -> ExportState {
        self.session().state().clone()
    }

    /// The payload shown in the preview pane.
    pub fn current_preview(&self) -> Option<Payload> {
        self.session().preview().cloned()
    }

    pub fn error(&self) -> Option<String> {
        self.session().error().map(str::to_string)
    }

    /// Close the dialog: back to Idle, preview and error cleared.
    pub fn close(&self) {
        self.session().close();
    }

    /// Start `action` and serialize `node` off the async thread.
    async fn run(
        &self,
        action: ExportAction,
        node: &CardNode,
    ) -> (RequestToken, ExportConfig, Result<Payload, ExportError>) {
        let config = self.config();
        let token = self.session().begin(action);

        let backend = Arc::clone(&self.backend);
        let node = node.clone();
        let job_config = config.clone();
        let result = tokio::task::spawn_blocking(move || serialize(&*backend, &node, &job_config))
            .await
            .map_err(ExportError::from)
            .and_then(|r| r.map_err(ExportError::from));

        (token, config, result)
    }

    /// Record a failure. The session keeps a translated message; the
    /// caller gets the underlying error.
    fn fail<T>(
        &self,
        token: RequestToken,
        action: ExportAction,
        error: ExportError,
    ) -> Result<Option<T>, ExportError> {
        let message = self.translator.t(action.failure_key());
        match self.session().resolve(token, Err(message)) {
            Resolution::Applied => {
                tracing::warn!(%action, error = %error, "export failed");
                Err(error)
            }
            Resolution::Discarded => Ok(None),
        }
    }

    /// Serialize `node` for on-screen display.
    pub async fn preview(&self, node: &CardNode) -> Result<Option<Payload>, ExportError> {
        let action = ExportAction::Preview;
        let (token, _, result) = self.run(action, node).await;
        match result {
            Ok(payload) => match self.session().resolve(token, Ok(Some(payload.clone()))) {
                Resolution::Applied => Ok(Some(payload)),
                Resolution::Discarded => Ok(None),
            },
            Err(e) => self.fail(token, action, e),
        }
    }

    /// Serialize `node` and write it to `<dir>/<file name>.<extension>`.
    pub async fn download(
        &self,
        node: &CardNode,
        dir: &Path,
    ) -> Result<Option<(PathBuf, Payload)>, ExportError> {
        let action = ExportAction::Download;
        let (token, config, result) = self.run(action, node).await;
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => return self.fail(token, action, e),
        };
        if !self.session().is_current(token) {
            return Ok(None);
        }

        let base = if config.file_name.trim().is_empty() {
            default_file_name()
        } else {
            config.file_name.trim().to_string()
        };
        let file_name = payload.file_name(&base);
        let path = dir.join(&file_name);
        let partial = dir.join(format!(".{file_name}.part"));
        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&partial, &payload.bytes).await
        }
        .await;
        if let Err(e) = written {
            remove_written(&partial).await;
            return self.fail(token, action, e.into());
        }
        if !self.session().is_current(token) {
            remove_written(&partial).await;
            return Ok(None);
        }
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            remove_written(&partial).await;
            return self.fail(token, action, e.into());
        }

        match self.session().resolve(token, Ok(None)) {
            Resolution::Applied => {
                tracing::info!(path = %path.display(), size = payload.bytes.len(), "card exported");
                Ok(Some((path, payload)))
            }
            Resolution::Discarded => {
                remove_written(&path).await;
                Ok(None)
            }
        }
    }

    /// Serialize `node` and put it on the clipboard.
    pub async fn copy_to_clipboard(&self, node: &CardNode) -> Result<Option<Payload>, ExportError> {
        let Some(clipboard) = self.clipboard.clone() else {
            return Err(ExportError::ClipboardUnavailable);
        };

        let action = ExportAction::Copy;
        let (token, _, result) = self.run(action, node).await;
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => return self.fail(token, action, e),
        };
        if !self.session().is_current(token) {
            return Ok(None);
        }

        let media_type = payload.media_type();
        let bytes = payload.bytes.clone();
        let written =
            tokio::task::spawn_blocking(move || clipboard.write(media_type, &bytes)).await;
        let written = match written {
            Ok(inner) => inner.map_err(ExportError::from),
            Err(e) => Err(ExportError::from(e)),
        };
        if let Err(e) = written {
            return self.fail(token, action, e);
        }

        match self.session().resolve(token, Ok(None)) {
            Resolution::Applied => Ok(Some(payload)),
            Resolution::Discarded => Ok(None),
        }
    }
}

/// Best-effort cleanup of a download that will not be reported.
async fn remove_written(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "could not remove unreported download");
        }
    }
}
