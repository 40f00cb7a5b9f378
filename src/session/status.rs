use crate::config::Messages;
use crate::session::worker::JobResult;

/// Session lifecycle as seen by a screen's state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

impl SessionStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionStatus::Ready)
    }
}

/// Status label text for a finished classification, the same for both screens.
pub fn describe_result(messages: &Messages, result: &JobResult, with_prefix: bool) -> String {
    match result {
        Ok(output) if with_prefix => format!("{}: {}", messages.results_prefix, output),
        Ok(output) => output.to_string(),
        Err(error) => format!("{}: {}", messages.classification_failed, error),
    }
}
