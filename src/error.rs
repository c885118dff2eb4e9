use thiserror::Error;

/// Errors surfaced by the bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The remote service answered 404 for a content read.
    #[error("Remote item not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status.
    /// `code` is the Graph `error.code` when the body carried one.
    #[error("Remote call failed with status {status}: {message}")]
    Transport {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced an HTTP response.
    #[error("Network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote service broke the protocol contract (cursor loop, missing upload url...).
    #[error("Protocol violation: {0}")]
    Protocol(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BridgeError {
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        BridgeError::Transport {
            status,
            code: None,
            message: message.into(),
        }
    }

    /// The Graph error code carried by a transport error
    pub fn graph_code(&self) -> Option<&str> {
        match self {
            BridgeError::Transport { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            BridgeError::NotFound(_) => Some(404),
            BridgeError::Transport { status, .. } => Some(*status),
            BridgeError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_of_errors() {
        assert_eq!(BridgeError::NotFound("/a".into()).status(), Some(404));
        assert_eq!(BridgeError::transport(503, "busy").status(), Some(503));
        assert_eq!(BridgeError::Protocol("loop".into()).status(), None);
    }

    #[test]
    fn test_graph_code() {
        let err = BridgeError::Transport {
            status: 404,
            code: Some("itemNotFound".into()),
            message: "gone".into(),
        };
        assert_eq!(err.graph_code(), Some("itemNotFound"));
        assert_eq!(BridgeError::transport(500, "x").graph_code(), None);
    }

    #[test]
    fn test_transport_message() {
        let err = BridgeError::transport(500, "boom");
        assert_eq!(err.to_string(), "Remote call failed with status 500: boom");
    }
}
