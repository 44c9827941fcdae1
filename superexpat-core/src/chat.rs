//! Chat session state: the append-only message log and the busy gate.
//!
//! A turn is split in two so the terminal loop can run the network call on a
//! worker thread:
//!
//! ```text
//! idle --begin_turn--> submitting --complete_turn(Ok|Err)--> idle
//! ```
//!
//! [`ChatSession::submit`] runs both halves back to back with a blocking
//! backend call in between.

use crate::client::ChatBackend;
use crate::error::{Error, Result};
use crate::types::{ChatResponse, Message};

/// Hint appended to transport failures.
pub const BACKEND_HINT: &str = "Please make sure the backend is running.";

/// A turn that has been accepted and is waiting for the backend.
///
/// Only [`ChatSession::begin_turn`] creates one, so holding a `PendingTurn`
/// proves the session is busy with exactly this query.
#[derive(Debug)]
#[must_use = "a pending turn must be completed or the session stays busy"]
pub struct PendingTurn {
    query: String,
}

impl PendingTurn {
    /// The trimmed text that was submitted.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Message log plus the single in-flight request flag.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<Message>,
    busy: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Accept `text` as a new user turn.
    ///
    /// Returns `None` without touching the log when a request is already in
    /// flight or the text is blank.
    pub fn begin_turn(&mut self, text: &str) -> Option<PendingTurn> {
        let query = text.trim();
        if self.busy || query.is_empty() {
            tracing::debug!(busy = self.busy, "Ignoring submission");
            return None;
        }

        self.messages.push(Message::user(query));
        self.busy = true;
        tracing::info!(turn = self.messages.len(), "Chat turn started");

        Some(PendingTurn {
            query: query.to_string(),
        })
    }

    /// Append the assistant turn for `pending` and release the busy flag.
    pub fn complete_turn(&mut self, pending: PendingTurn, outcome: Result<ChatResponse>) {
        let message = match outcome {
            Ok(response) => {
                tracing::info!(
                    total_results = response.total_results,
                    items = response.results.len(),
                    summary = response.summary().is_some(),
                    "Chat turn succeeded"
                );
                Message::assistant(response)
            }
            Err(err) => {
                tracing::warn!(query = %pending.query, error = %err, "Chat turn failed");
                Message::assistant_error(error_text(&err))
            }
        };

        self.messages.push(message);
        self.busy = false;
    }

    /// Run a whole turn against `backend`, blocking until it settles.
    ///
    /// Returns false when the submission was rejected.
    pub fn submit(&mut self, backend: &dyn ChatBackend, text: &str) -> bool {
        let Some(pending) = self.begin_turn(text) else {
            return false;
        };
        let outcome = backend.send(pending.query());
        self.complete_turn(pending, outcome);
        true
    }

    /// The most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Human-readable description of a failed turn.
///
/// Only failures that never reached the backend carry [`BACKEND_HINT`]; an
/// HTTP status means the backend is up, so those read "Request failed: ...".
pub fn error_text(err: &Error) -> String {
    if err.is_transport() {
        format!("Connection error: {err}. {BACKEND_HINT}")
    } else {
        format!("Request failed: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Item, Role};
    use std::sync::Mutex;

    /// Backend that replays canned outcomes and records queries.
    struct ScriptedBackend {
        outcomes: Mutex<Vec<Result<ChatResponse>>>,
        queries: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(outcomes: Vec<Result<ChatResponse>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatBackend for ScriptedBackend {
        fn send(&self, message: &str) -> Result<ChatResponse> {
            self.queries.lock().unwrap().push(message.to_string());
            self.outcomes.lock().unwrap().remove(0)
        }
    }

    fn response(total: u64, items: usize) -> ChatResponse {
        ChatResponse {
            total_results: total,
            ai_summary: None,
            results: vec![Item::default(); items],
            intent: None,
            query: None,
            location: None,
            pagination: None,
        }
    }

    #[test]
    fn test_turn_grows_log_by_two() {
        let mut session = ChatSession::new();

        let pending = session.begin_turn("events in London").unwrap();
        assert_eq!(session.messages().len(), 1);
        assert!(session.is_busy());
        assert_eq!(pending.query(), "events in London");

        session.complete_turn(pending, Ok(response(3, 3)));
        assert_eq!(session.messages().len(), 2);
        assert!(!session.is_busy());

        let last = session.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(!last.error);
        assert_eq!(last.data.as_ref().unwrap().results.len(), 3);
    }

    #[test]
    fn test_submit_while_busy_is_ignored() {
        let mut session = ChatSession::new();
        let pending = session.begin_turn("first").unwrap();

        assert!(session.begin_turn("second").is_none());
        assert_eq!(session.messages().len(), 1);

        session.complete_turn(pending, Ok(response(0, 0)));
        assert!(session.begin_turn("second").is_some());
    }

    #[test]
    fn test_blank_submission_is_ignored() {
        let mut session = ChatSession::new();
        assert!(session.begin_turn("").is_none());
        assert!(session.begin_turn("   \t\n").is_none());
        assert!(session.is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_user_text_is_trimmed() {
        let mut session = ChatSession::new();
        let pending = session.begin_turn("  jobs in Berlin  ").unwrap();
        assert_eq!(pending.query(), "jobs in Berlin");
        assert_eq!(
            session.messages()[0].content.as_deref(),
            Some("jobs in Berlin")
        );
        session.complete_turn(pending, Ok(response(0, 0)));
    }

    #[test]
    fn test_http_error_turn() {
        let mut session = ChatSession::new();
        let pending = session.begin_turn("jobs").unwrap();
        session.complete_turn(
            pending,
            Err(Error::Http {
                status: 500,
                reason: "Internal Server Error".to_string(),
            }),
        );

        let last = session.last().unwrap();
        assert!(last.error);
        assert_eq!(
            last.content.as_deref(),
            Some("Request failed: HTTP 500: Internal Server Error")
        );
        assert!(!session.is_busy());
    }

    #[test]
    fn test_error_text_hint_only_for_transport() {
        let http = error_text(&Error::Http {
            status: 404,
            reason: "Not Found".to_string(),
        });
        assert!(!http.contains(BACKEND_HINT));

        let transport = error_text(&Error::Transport("connection refused".to_string()));
        assert_eq!(
            transport,
            format!("Connection error: connection refused. {BACKEND_HINT}")
        );
    }

    #[test]
    fn test_transport_error_turn_has_hint() {
        let mut session = ChatSession::new();
        let pending = session.begin_turn("jobs").unwrap();
        session.complete_turn(pending, Err(Error::Transport("Failed to fetch".to_string())));

        let text = session.last().unwrap().content.clone().unwrap();
        assert!(text.contains("Failed to fetch"));
        assert!(text.contains(BACKEND_HINT));
    }

    #[test]
    fn test_submit_runs_backend_once_per_turn() {
        let backend = ScriptedBackend::new(vec![
            Ok(response(1, 1)),
            Err(Error::Transport("Failed to fetch".to_string())),
        ]);
        let mut session = ChatSession::new();

        assert!(session.submit(&backend, "events in Paris"));
        assert!(!session.submit(&backend, "  "));
        assert!(session.submit(&backend, "jobs in Paris"));

        assert_eq!(session.messages().len(), 4);
        assert_eq!(
            *backend.queries.lock().unwrap(),
            vec!["events in Paris".to_string(), "jobs in Paris".to_string()]
        );
        assert!(!session.messages()[1].error);
        assert!(session.messages()[3].error);
    }
}
