//! Export dialog state machine.
//!
//! ```text
//!            begin                 ok (preview)
//!   Idle ───────────► Processing ─────────────► PreviewReady
//!    ▲                  │    │                      │
//!    │  ok (download,   │    │ err                  │ begin
//!    └──── copy) ───────┘    ▼                      ▼
//!                          Error ──── begin ──► Processing
//!
//!   close(): any state → Idle
//! ```
//!
//! Every [`begin`](ExportSession::begin) issues a fresh, strictly increasing
//! [`RequestToken`]. Only the result carrying the latest token is applied;
//! anything older, including everything issued before a `close()`, is
//! discarded when it arrives.

use super::format::Payload;
use std::fmt;

/// What the user asked the dialog to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportAction {
    Preview,
    Download,
    Copy,
}

impl ExportAction {
    /// Translation key of the message shown when this action fails.
    pub fn failure_key(self) -> &'static str {
        match self {
            ExportAction::Preview => "export.failedPreview",
            ExportAction::Download => "export.failedExport",
            ExportAction::Copy => "export.failedCopy",
        }
    }
}

impl fmt::Display for ExportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportAction::Preview => "preview",
            ExportAction::Download => "download",
            ExportAction::Copy => "copy",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Processing(ExportAction),
    PreviewReady,
    Error(String),
}

/// Identifies one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Discarded,
}

/// Per-dialog export state.
#[derive(Debug)]
pub struct ExportSession {
    state: ExportState,
    latest: u64,
    pending: Option<ExportAction>,
    preview: Option<Payload>,
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportSession {
    pub fn new() -> Self {
        Self {
            state: ExportState::Idle,
            latest: 0,
            pending: None,
            preview: None,
        }
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// The last successful preview, if it has not been cleared.
    pub fn preview(&self) -> Option<&Payload> {
        self.preview.as_ref()
    }

    /// The message of the current error, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            ExportState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Start `action`. Any request still in flight becomes stale.
    pub fn begin(&mut self, action: ExportAction) -> RequestToken {
        self.latest += 1;
        self.pending = Some(action);
        self.state = ExportState::Processing(action);
        tracing::debug!(%action, token = self.latest, "export request started");
        RequestToken(self.latest)
    }

    /// Whether `token` is the latest request and still pending.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest && self.pending.is_some()
    }

    /// Apply the outcome of the request identified by `token`.
    ///
    /// `result` is the payload (for a preview) or nothing (for download and
    /// copy) on success, or a human-readable message on failure. A failure
    /// leaves any earlier preview in place.
    pub fn resolve(
        &mut self,
        token: RequestToken,
        result: Result<Option<Payload>, String>,
    ) -> Resolution {
        if !self.is_current(token) {
            tracing::debug!(token = token.0, latest = self.latest, "discarding stale export result");
            return Resolution::Discarded;
        }
        let Some(action) = self.pending.take() else {
            return Resolution::Discarded;
        };

        self.state = match (action, result) {
            (ExportAction::Preview, Ok(payload)) => {
                self.preview = payload;
                ExportState::PreviewReady
            }
            (ExportAction::Download | ExportAction::Copy, Ok(_)) => {
                self.preview = None;
                ExportState::Idle
            }
            (_, Err(message)) => ExportState::Error(message),
        };
        Resolution::Applied
    }

    /// Reset to Idle, dropping the preview and error. In-flight requests
    /// resolve as [`Resolution::Discarded`].
    pub fn close(&mut self) {
        self.latest += 1;
        self.pending = None;
        self.preview = None;
        self.state = ExportState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::format::ExportFormat;

    fn payload(tag: u8) -> Payload {
        Payload {
            format: ExportFormat::Png,
            bytes: vec![tag],
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn preview_success_reaches_preview_ready() {
        let mut session = ExportSession::new();
        let token = session.begin(ExportAction::Preview);
        assert_eq!(session.state(), &ExportState::Processing(ExportAction::Preview));

        assert_eq!(session.resolve(token, Ok(Some(payload(1)))), Resolution::Applied);
        assert_eq!(session.state(), &ExportState::PreviewReady);
        assert_eq!(session.preview(), Some(&payload(1)));
    }

    #[test]
    fn download_success_returns_to_idle() {
        let mut session = ExportSession::new();
        let token = session.begin(ExportAction::Preview);
        session.resolve(token, Ok(Some(payload(1))));

        let token = session.begin(ExportAction::Download);
        assert_eq!(session.resolve(token, Ok(None)), Resolution::Applied);
        assert_eq!(session.state(), &ExportState::Idle);
        assert_eq!(session.preview(), None);
    }

    #[test]
    fn failure_keeps_previous_preview() {
        let mut session = ExportSession::new();
        let token = session.begin(ExportAction::Preview);
        session.resolve(token, Ok(Some(payload(1))));

        let token = session.begin(ExportAction::Preview);
        session.resolve(token, Err("boom".to_string()));

        assert_eq!(session.state(), &ExportState::Error("boom".to_string()));
        assert_eq!(session.error(), Some("boom"));
        assert_eq!(session.preview(), Some(&payload(1)));
    }

    #[test]
    fn retry_from_error() {
        let mut session = ExportSession::new();
        let token = session.begin(ExportAction::Copy);
        session.resolve(token, Err("denied".to_string()));

        let token = session.begin(ExportAction::Copy);
        assert_eq!(session.state(), &ExportState::Processing(ExportAction::Copy));
        assert_eq!(session.error(), None);
        session.resolve(token, Ok(None));
        assert_eq!(session.state(), &ExportState::Idle);
    }

    #[test]
    fn tokens_increase() {
        let mut session = ExportSession::new();
        let a = session.begin(ExportAction::Preview);
        let b = session.begin(ExportAction::Preview);
        assert!(b > a);
    }

    #[test]
    fn superseded_result_is_discarded() {
        let mut session = ExportSession::new();
        let old = session.begin(ExportAction::Preview);
        let new = session.begin(ExportAction::Preview);

        assert_eq!(session.resolve(old, Ok(Some(payload(1)))), Resolution::Discarded);
        assert_eq!(session.state(), &ExportState::Processing(ExportAction::Preview));

        assert_eq!(session.resolve(new, Ok(Some(payload(2)))), Resolution::Applied);
        assert_eq!(session.preview(), Some(&payload(2)));
    }

    #[test]
    fn close_discards_in_flight_result() {
        let mut session = ExportSession::new();
        let token = session.begin(ExportAction::Preview);
        session.close();

        assert_eq!(session.resolve(token, Ok(Some(payload(1)))), Resolution::Discarded);
        assert_eq!(session.state(), &ExportState::Idle);
        assert_eq!(session.preview(), None);

        let token = session.begin(ExportAction::Preview);
        session.close();
        assert_eq!(session.resolve(token, Err("late".to_string())), Resolution::Discarded);
        assert_eq!(session.error(), None);
    }

    #[test]
    fn token_resolves_once() {
        let mut session = ExportSession::new();
        let token = session.begin(ExportAction::Download);
        assert_eq!(session.resolve(token, Ok(None)), Resolution::Applied);
        assert_eq!(session.resolve(token, Err("again".to_string())), Resolution::Discarded);
        assert_eq!(session.state(), &ExportState::Idle);
    }

    #[test]
    fn failure_keys() {
        assert_eq!(ExportAction::Preview.failure_key(), "export.failedPreview");
        assert_eq!(ExportAction::Download.failure_key(), "export.failedExport");
        assert_eq!(ExportAction::Copy.failure_key(), "export.failedCopy");
    }
}
