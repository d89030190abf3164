//! # Strato Resilience
//!
//! Control-flow primitives shared by the Strato client:
//!
//! - [`ExecutionContext`]: a cancellation token plus an optional deadline,
//!   the bound every long-running operation runs under.
//! - [`poll_context`]: run a fetch task at a fixed interval until an
//!   [`Acceptance`] condition holds, a task fails, or the context finishes.
//! - [`RetryPolicy`]: exponential, jittered retries for a single request.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use strato_resilience::{Acceptance, ExecutionContext, Observation, poll_context};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));
//! let acceptance = Acceptance::new().status(200);
//!
//! let outcome = poll_context(&ctx, Duration::from_millis(10), &acceptance, || async {
//!     Ok::<_, std::io::Error>(Observation::new(200, ()))
//! })
//! .await?;
//! assert_eq!(outcome.attempts, 1);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod poll;
pub mod retry;

pub use context::ExecutionContext;
pub use error::{ConfigError, ConfigResult, ContextError, PollError};
pub use poll::{Acceptance, Observation, PollOutcome, Predicate, poll_context};
pub use retry::RetryPolicy;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        Acceptance, ContextError, ExecutionContext, Observation, PollError, RetryPolicy,
        poll_context,
    };
}
