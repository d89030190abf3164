//! Client error types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transport::TransportError;

/// Result alias used across the client.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error body returned by the service for a non-2xx reply.
///
/// Replies whose body is not a JSON error object are still converted: the
/// body text becomes the `reason`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// HTTP status the error arrived with
    #[serde(skip)]
    pub status: u16,
    pub kind: Option<String>,
    pub id: Option<String>,
    pub href: Option<String>,
    pub code: Option<String>,
    pub reason: Option<String>,
    pub operation_id: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Decode the error carried by a reply with the given status.
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<Self>(body) {
            Ok(mut error) => {
                error.status = status;
                error
            }
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_owned();
                Self {
                    status,
                    reason: (!text.is_empty()).then_some(text),
                    ..Self::default()
                }
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, ", code '{code}'")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        if let Some(operation_id) = &self.operation_id {
            write!(f, " (operation {operation_id})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Errors produced by the client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode response with status {status}: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("response with status {status} has no body")]
    EmptyBody { status: u16 },

    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl Error {
    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Decode { status, .. } | Self::EmptyBody { status } => Some(*status),
            Self::Api(error) => Some(error.status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
