//! Client Error Types
//!
//! One error enum for every remote surface (auth, rest, storage, realtime).

use serde::{Deserialize, Serialize};

/// Common result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by the backend client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClientError {
    /// Server answered with a non-success status
    Api { status: u16, message: String },
    /// Request never completed (DNS, socket, fetch failure)
    Network(String),
    /// Response body did not match the expected shape
    Decode(String),
    /// Request body could not be serialized
    Encode(String),
    /// WebSocket-level failure
    Socket(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Decode(msg) => write!(f, "Decode error: {}", msg),
            ClientError::Encode(msg) => write!(f, "Encode error: {}", msg),
            ClientError::Socket(msg) => write!(f, "Socket error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Turn a non-success response into an [`ClientError::Api`], consuming the body
pub(crate) async fn api_error(resp: reqwest::Response) -> ClientError {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    ClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_message() {
        let err = ClientError::Api { status: 401, message: "invalid token".into() };
        assert_eq!(err.to_string(), "API error (401): invalid token");
    }

    #[test]
    fn display_network() {
        let err = ClientError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }
}
