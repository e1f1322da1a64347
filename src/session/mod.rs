//! Transient interaction state for the generation workflow.

use crate::history::{HistoryEntry, HistoryStore};
use crate::service::{GenerateService, ServiceError};
use std::sync::Arc;
use tracing::debug;

/// User-facing message for a failed generation request.
const GENERATION_FAILED_MSG: &str =
    "An error occurred while generating the email. Please try again.";
/// User-facing message when the request timed out.
const GENERATION_TIMEOUT_MSG: &str = "The request timed out. Please try again.";

/// Where the session is in the submit/view cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Fresh form; submission and viewing are both available.
    Idle,
    /// A generation request is outstanding. No second request may start.
    Pending,
    /// A stored entry is displayed read-only; the form is suspended.
    Viewing(i64),
}

/// Outcome of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Guard rejected the submission (empty URL or not idle). No state
    /// changed and no request was issued.
    Rejected,
    /// The service returned an email; it is now the current result and the
    /// newest history entry.
    Generated(HistoryEntry),
    /// The service failed; see [`GenerationSession::last_error`].
    Failed,
}

/// Orchestrates one generation round trip at a time and reconciles the
/// outcome with the history store.
pub struct GenerationSession {
    store: HistoryStore,
    service: Arc<dyn GenerateService>,
    mode: SessionMode,
    url_input: String,
    current_result: String,
    last_error: Option<String>,
}

impl GenerationSession {
    pub fn new(store: HistoryStore, service: Arc<dyn GenerateService>) -> Self {
        Self {
            store,
            service,
            mode: SessionMode::Idle,
            url_input: String::new(),
            current_result: String::new(),
            last_error: None,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn set_url_input(&mut self, url: impl Into<String>) {
        self.url_input = url.into();
    }

    /// Most recent successfully generated email, empty if none yet.
    pub fn current_result(&self) -> &str {
        &self.current_result
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.store
    }

    /// The entry currently displayed read-only, if any.
    pub fn viewed_entry(&self) -> Option<&HistoryEntry> {
        match self.mode {
            SessionMode::Viewing(id) => self.store.get(id),
            _ => None,
        }
    }

    /// Text the copy action operates on: the viewed entry's email when
    /// viewing, otherwise the current result.
    pub fn display_text(&self) -> Option<&str> {
        if let SessionMode::Viewing(id) = self.mode {
            return self.store.get(id).map(|e| e.generated_text.as_str());
        }
        if self.current_result.is_empty() {
            None
        } else {
            Some(&self.current_result)
        }
    }

    /// Submit the current URL input and wait for the outcome.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if !self.begin_submit() {
            return SubmitOutcome::Rejected;
        }

        let service = Arc::clone(&self.service);
        let url = self.url_input.clone();
        match service.generate(&url).await {
            Ok(text) => SubmitOutcome::Generated(self.complete_success(text)),
            Err(e) => {
                self.complete_failure(&e);
                SubmitOutcome::Failed
            }
        }
    }

    /// Enter `Pending` if submission is allowed right now.
    ///
    /// Single-flight guard: a blank URL or any non-idle mode rejects the
    /// submission silently, leaving all state untouched. Concurrent
    /// submissions are suppressed, never queued.
    pub fn begin_submit(&mut self) -> bool {
        if self.url_input.trim().is_empty() || self.mode != SessionMode::Idle {
            return false;
        }
        self.mode = SessionMode::Pending;
        true
    }

    /// Record a successful generation: update the current result, append to
    /// history, and return to `Idle`.
    pub fn complete_success(&mut self, text: String) -> HistoryEntry {
        let entry = self.store.add(&self.url_input, &text);
        self.current_result = text;
        self.last_error = None;
        self.mode = SessionMode::Idle;
        entry
    }

    /// Record a failed generation: set the user-facing error and return to
    /// `Idle`. History and the current result are untouched; there is no
    /// automatic retry.
    pub fn complete_failure(&mut self, err: &ServiceError) {
        debug!("generation failed: {err}");
        self.last_error = Some(
            match err {
                ServiceError::Timeout => GENERATION_TIMEOUT_MSG,
                _ => GENERATION_FAILED_MSG,
            }
            .to_string(),
        );
        self.mode = SessionMode::Idle;
    }

    /// Display a stored entry read-only. Only available from `Idle`, and
    /// only for ids present in history; otherwise a no-op.
    pub fn view(&mut self, id: i64) -> bool {
        if self.mode != SessionMode::Idle || self.store.get(id).is_none() {
            return false;
        }
        self.mode = SessionMode::Viewing(id);
        true
    }

    /// Return to a fresh submission form, clearing the viewed entry, the
    /// URL input, and the current result. No-op while a request is pending.
    pub fn reset(&mut self) {
        if self.mode == SessionMode::Pending {
            return;
        }
        self.mode = SessionMode::Idle;
        self.url_input.clear();
        self.current_result.clear();
        self.last_error = None;
    }

    /// Delete an entry from history. Deleting the currently viewed entry
    /// falls back to `Idle`.
    pub fn delete(&mut self, id: i64) {
        self.store.remove(id);
        if self.mode == SessionMode::Viewing(id) {
            self.mode = SessionMode::Idle;
        }
    }
}
