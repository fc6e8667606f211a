use thiserror::Error;

/// Errors from the remote chat service call.
///
/// Everything except `Unknown` carries a cause that can be shown to the user
/// as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatClientError {
    #[error("network request failed: {0}")]
    Transport(String),

    #[error("malformed response from chat service: {0}")]
    Malformed(String),

    #[error("chat service rejected the message: {0}")]
    Rejected(String),

    #[error("an unknown error occurred while contacting the chat service")]
    Unknown,
}

impl ChatClientError {
    /// Whether the failure came with no structured cause.
    pub fn is_unknown(&self) -> bool {
        matches!(self, ChatClientError::Unknown)
    }
}

/// Errors from message store operations (used by the trait definitions in chatbot-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors returned by `ChatSession` operations.
///
/// Send failures are not errors at this level: they are reported in the
/// `SubmitOutcome` / `ReplayReport` so the caller always gets to show them.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_client_error_display() {
        let err = ChatClientError::Rejected("You're sending the same message over and over.".to_string());
        assert_eq!(
            err.to_string(),
            "chat service rejected the message: You're sending the same message over and over."
        );
    }

    #[test]
    fn test_unknown_is_unknown() {
        assert!(ChatClientError::Unknown.is_unknown());
        assert!(!ChatClientError::Transport("timed out".to_string()).is_unknown());
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_session_error_from_repository() {
        let err: SessionError = RepositoryError::NotFound.into();
        assert!(matches!(err, SessionError::Storage(RepositoryError::NotFound)));
        assert_eq!(err.to_string(), "storage error: entity not found");
    }
}
