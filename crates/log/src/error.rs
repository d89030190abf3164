//! Error handling for strato-log

use thiserror::Error;

/// Type alias for Result with [`LogError`] for logging operations
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while setting up logging
#[derive(Debug, Error)]
pub enum LogError {
    /// Filter directives could not be parsed
    #[error("invalid filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    /// Unknown output format name
    #[error("unknown log format '{0}', expected pretty, compact or json")]
    Format(String),

    /// A global subscriber is already installed
    #[error("failed to install logger: {0}")]
    Init(String),
}
