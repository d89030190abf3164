//! Poll-until-accepted driver.
//!
//! [`poll_context`] repeatedly runs a fetch task until its result satisfies
//! an [`Acceptance`] condition. It never retries a failed task and never
//! polls without a deadline:
//!
//! - a task error ends the loop immediately with [`PollError::Transport`];
//! - a result that is not accepted is followed by a fixed `interval` sleep;
//! - the context is checked before every attempt and raced against both the
//!   task and the sleep, so expiry or cancellation stops the loop promptly.
//!
//! ```rust
//! use std::time::Duration;
//! use strato_resilience::{Acceptance, ExecutionContext, Observation, poll_context};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = ExecutionContext::with_timeout(Duration::from_secs(30));
//! let acceptance = Acceptance::new()
//!     .status(200)
//!     .predicate(|state: &String| state == "ready");
//!
//! let outcome = poll_context(&ctx, Duration::from_secs(1), &acceptance, || async {
//!     Ok::<_, std::io::Error>(Observation::new(200, "ready".to_string()))
//! })
//! .await?;
//! assert_eq!(outcome.value, "ready");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::time::Duration;

use smallvec::SmallVec;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::context::ExecutionContext;
use crate::error::PollError;

/// Boxed predicate over a polled value.
pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Acceptable statuses plus predicates that must all hold.
///
/// An empty status set accepts any status.
pub struct Acceptance<T> {
    statuses: SmallVec<[u16; 4]>,
    predicates: Vec<Predicate<T>>,
}

impl<T> Acceptance<T> {
    /// Accepts everything until statuses or predicates are added.
    #[must_use]
    pub fn new() -> Self {
        Self {
            statuses: SmallVec::new(),
            predicates: Vec::new(),
        }
    }

    /// Add an acceptable status code.
    #[must_use]
    pub fn status(mut self, code: u16) -> Self {
        self.add_status(code);
        self
    }

    /// Add a predicate that must return `true`.
    #[must_use]
    pub fn predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.add_predicate(predicate);
        self
    }

    /// In-place form of [`status`](Self::status).
    pub fn add_status(&mut self, code: u16) {
        if !self.statuses.contains(&code) {
            self.statuses.push(code);
        }
    }

    /// In-place form of [`predicate`](Self::predicate).
    pub fn add_predicate<P>(&mut self, predicate: P)
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
    }

    /// Registered status codes, in insertion order.
    pub fn statuses(&self) -> &[u16] {
        &self.statuses
    }

    /// Number of registered predicates.
    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    /// Whether an observation with `status` and `value` ends the poll.
    pub fn accepts(&self, status: u16, value: &T) -> bool {
        let status_ok = self.statuses.is_empty() || self.statuses.contains(&status);
        status_ok && self.predicates.iter().all(|predicate| predicate(value))
    }
}

impl<T> Default for Acceptance<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Acceptance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acceptance")
            .field("statuses", &self.statuses)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// One successful fetch: the status it answered with and the decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation<T> {
    /// HTTP-style status code
    pub status: u16,
    /// Decoded value
    pub value: T,
}

impl<T> Observation<T> {
    /// Create an observation.
    pub fn new(status: u16, value: T) -> Self {
        Self { status, value }
    }
}

/// The accepted observation together with loop statistics.
#[derive(Debug, Clone)]
pub struct PollOutcome<T> {
    /// Status of the accepted observation
    pub status: u16,
    /// Accepted value
    pub value: T,
    /// Number of task invocations, including the accepted one
    pub attempts: u32,
    /// Time from the first attempt until acceptance
    pub elapsed: Duration,
}

/// Check the preconditions of [`poll_context`] without running anything.
pub fn validate<E>(ctx: &ExecutionContext, interval: Duration) -> Result<(), PollError<E>> {
    if ctx.deadline().is_none() {
        return Err(PollError::MissingDeadline);
    }
    if interval.is_zero() {
        return Err(PollError::InvalidInterval { interval });
    }
    Ok(())
}

/// Run `task` every `interval` until `acceptance` holds.
///
/// Returns the accepted observation, the first task error, or the context
/// error once `ctx` is cancelled or past its deadline. `ctx` must carry a
/// deadline and `interval` must be non-zero; both are checked before the
/// first attempt.
pub async fn poll_context<T, E, F, Fut>(
    ctx: &ExecutionContext,
    interval: Duration,
    acceptance: &Acceptance<T>,
    mut task: F,
) -> Result<PollOutcome<T>, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Observation<T>, E>>,
    E: fmt::Display,
{
    validate(ctx, interval)?;

    let started = Instant::now();
    let mut attempts: u32 = 0;

    loop {
        if let Some(source) = ctx.err() {
            debug!(attempts, error = %source, "poll context finished before next attempt");
            return Err(PollError::Context { attempts, source });
        }

        attempts += 1;
        let observation = match ctx.run(task()).await {
            Ok(Ok(observation)) => observation,
            Ok(Err(source)) => {
                warn!(attempt = attempts, error = %source, "poll attempt failed");
                return Err(PollError::Transport {
                    attempt: attempts,
                    source,
                });
            }
            Err(source) => {
                debug!(attempt = attempts, error = %source, "poll attempt interrupted");
                return Err(PollError::Context { attempts, source });
            }
        };

        if acceptance.accepts(observation.status, &observation.value) {
            let elapsed = started.elapsed();
            info!(
                attempts,
                status = observation.status,
                elapsed_ms = elapsed.as_millis() as u64,
                "poll condition satisfied"
            );
            return Ok(PollOutcome {
                status: observation.status,
                value: observation.value,
                attempts,
                elapsed,
            });
        }

        debug!(
            attempt = attempts,
            status = observation.status,
            interval_ms = interval.as_millis() as u64,
            "poll condition not satisfied, waiting"
        );

        if let Err(source) = ctx.sleep(interval).await {
            debug!(attempts, error = %source, "poll context finished while waiting");
            return Err(PollError::Context { attempts, source });
        }
    }
}
