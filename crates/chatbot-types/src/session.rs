//! Results of chat session operations.
//!
//! `SubmitOutcome` is what a single send resolves to; `ReplayReport`
//! summarizes one pass over the offline outbox.

use serde::Serialize;
use thiserror::Error;

use crate::chat::BotReply;
use crate::error::ChatClientError;
use crate::outbox::OutboxEntry;

/// Result of submitting one user utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// The service answered and the reply was stored.
    Delivered { reply: BotReply },
    /// The service call failed. The user message stays in history.
    Failed {
        #[serde(serialize_with = "serialize_display")]
        cause: ChatClientError,
    },
    /// Offline: the utterance was placed in the outbox.
    QueuedOffline { entry: OutboxEntry },
}

/// Why a replay pass stopped before draining the outbox.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplayStop {
    #[error(transparent)]
    Client(#[from] ChatClientError),

    #[error("connectivity was lost")]
    Offline,

    /// Another replay pass (possibly in another process) holds the entry.
    #[error("entry is being replayed by another pass")]
    Claimed,
}

/// A replay pass stopped partway.
///
/// `failed_at` is the zero-based position of the failing entry within the
/// pass; that entry and everything after it are still queued.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("replay interrupted at entry {failed_at} (outbox id {entry_id}): {cause}")]
pub struct ReplayFailure {
    pub failed_at: usize,
    pub entry_id: i64,
    pub cause: ReplayStop,
}

/// Summary of one replay pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Entries whose send was started in this pass (including a failed one).
    pub attempted: usize,
    /// Entries fully replayed and removed from the outbox.
    pub replayed: usize,
    #[serde(serialize_with = "serialize_optional_display")]
    pub failure: Option<ReplayFailure>,
}

impl ReplayReport {
    /// Whether the pass drained everything it looked at.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Convert into a `Result`, treating an interrupted pass as an error.
    pub fn into_result(self) -> Result<usize, ReplayFailure> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.replayed),
        }
    }
}

fn serialize_display<T: std::fmt::Display, S: serde::Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn serialize_optional_display<T: std::fmt::Display, S: serde::Serializer>(
    value: &Option<T>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_complete() {
        let report = ReplayReport::default();
        assert_eq!(report.attempted, 0);
        assert!(report.is_complete());
        assert_eq!(report.into_result().unwrap(), 0);
    }

    #[test]
    fn test_interrupted_report_into_result() {
        let report = ReplayReport {
            attempted: 3,
            replayed: 2,
            failure: Some(ReplayFailure {
                failed_at: 2,
                entry_id: 17,
                cause: ReplayStop::Client(ChatClientError::Transport("timed out".to_string())),
            }),
        };
        assert!(!report.is_complete());

        let failure = report.into_result().unwrap_err();
        assert_eq!(failure.failed_at, 2);
        assert_eq!(
            failure.to_string(),
            "replay interrupted at entry 2 (outbox id 17): network request failed: timed out"
        );
    }

    #[test]
    fn test_offline_stop_display() {
        assert_eq!(ReplayStop::Offline.to_string(), "connectivity was lost");
        assert_eq!(
            ReplayStop::Claimed.to_string(),
            "entry is being replayed by another pass"
        );
    }

    #[test]
    fn test_failed_outcome_serializes_cause_as_text() {
        let outcome = SubmitOutcome::Failed {
            cause: ChatClientError::Unknown,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(
            json["cause"],
            "an unknown error occurred while contacting the chat service"
        );
    }
}
