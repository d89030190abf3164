//! Error types for contexts, polling and retry configuration

use std::time::Duration;

use thiserror::Error;

/// Why an [`ExecutionContext`](crate::ExecutionContext) is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContextError {
    /// The context (or one of its ancestors) was cancelled explicitly.
    #[error("context cancelled")]
    Cancelled,

    /// The context deadline elapsed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Failure of a poll loop.
///
/// `E` is the error type of the task being polled (for the HTTP client this
/// is the client error carrying the transport failure).
#[derive(Debug, Error)]
pub enum PollError<E> {
    /// Polling was started with a context that has no deadline.
    #[error("polling requires a context with a deadline or timeout")]
    MissingDeadline,

    /// Polling was started with a zero interval.
    #[error("poll interval must be greater than zero, got {interval:?}")]
    InvalidInterval {
        /// The rejected interval
        interval: Duration,
    },

    /// The task itself failed; polling does not retry these.
    #[error("poll attempt {attempt} failed: {source}")]
    Transport {
        /// 1-based attempt that failed
        attempt: u32,
        /// The task error
        #[source]
        source: E,
    },

    /// The context was cancelled or expired before the condition held.
    #[error("polling stopped after {attempts} attempts: {source}")]
    Context {
        /// Attempts started before the context finished
        attempts: u32,
        /// Cancellation or expiry
        #[source]
        source: ContextError,
    },
}

impl<E> PollError<E> {
    /// True for the errors raised before any attempt was made.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingDeadline | Self::InvalidInterval { .. })
    }

    /// The context error, if polling stopped because the context finished.
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            Self::Context { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// True if the context deadline elapsed.
    pub fn is_deadline_exceeded(&self) -> bool {
        self.context_error() == Some(ContextError::DeadlineExceeded)
    }

    /// The task error, if an attempt failed.
    pub fn transport_error(&self) -> Option<&E> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Map the task error type, keeping every other variant.
    pub fn map_transport<F, U>(self, f: F) -> PollError<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            Self::MissingDeadline => PollError::MissingDeadline,
            Self::InvalidInterval { interval } => PollError::InvalidInterval { interval },
            Self::Transport { attempt, source } => PollError::Transport {
                attempt,
                source: f(source),
            },
            Self::Context { attempts, source } => PollError::Context { attempts, source },
        }
    }
}

/// Invalid resilience configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field holds a value outside its allowed range
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Create a validation error for `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;
