//! Deadline-bound, cancellable execution context.
//!
//! An [`ExecutionContext`] pairs a [`CancellationToken`] with an optional
//! deadline. Long-running operations (polling loops, retried requests) race
//! their suspension points against [`ExecutionContext::done`] so that an
//! explicit cancel or an elapsed deadline stops them promptly.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ContextError;

/// Deadline used when `now + timeout` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + timeout`, saturated to [`FAR_FUTURE`] on overflow.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Cancellation token plus optional deadline.
///
/// Cloning shares the same token and deadline. Use [`child`](Self::child) or
/// [`child_with_timeout`](Self::child_with_timeout) to derive a context that
/// can be cancelled on its own without affecting the parent.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl ExecutionContext {
    /// Context with no deadline that is only done when cancelled.
    #[must_use]
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Context whose deadline is `timeout` from now.
    ///
    /// Timeouts too large to represent expire thirty years from now.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(deadline_after(timeout))
    }

    /// Context that expires at `deadline`.
    #[must_use]
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// Replace the cancellation token, e.g. to hook a shutdown signal.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Child context: cancelled when the parent is, keeps the parent deadline.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Child context whose deadline is the earlier of the parent's and
    /// `timeout` from now.
    #[must_use]
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = deadline_after(timeout);
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Request cancellation of this context and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The deadline, if one was set.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline; `Some(Duration::ZERO)` once it passed.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// The underlying cancellation token.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// `Some` once the context is cancelled or past its deadline.
    ///
    /// Cancellation wins over expiry when both apply.
    #[must_use]
    pub fn err(&self) -> Option<ContextError> {
        if self.token.is_cancelled() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Whether [`err`](Self::err) would return `Some`.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves when the context is cancelled or its deadline elapses.
    pub async fn done(&self) -> ContextError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => ContextError::Cancelled,
                    () = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ContextError::Cancelled
            }
        }
    }

    /// Drive `future` to completion unless the context finishes first.
    ///
    /// The future is dropped as soon as the context is done, so an in-flight
    /// HTTP request is aborted rather than awaited.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = future => Ok(output),
        }
    }

    /// Sleep for `duration`, returning early with the context error if the
    /// context finishes first.
    pub async fn sleep(&self, duration: Duration) -> Result<(), ContextError> {
        self.run(tokio::time::sleep(duration)).await
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn background_has_no_deadline() {
        let ctx = ExecutionContext::background();
        assert!(ctx.deadline().is_none());
        assert!(ctx.remaining().is_none());
        assert!(ctx.err().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expires() {
        let ctx = ExecutionContext::with_timeout(Duration::from_secs(5));
        assert_eq!(ctx.remaining(), Some(Duration::from_secs(5)));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_propagates_to_children_only_downwards() {
        let parent = ExecutionContext::with_timeout(Duration::from_secs(60));
        let child = parent.child();
        let sibling = parent.child();

        child.cancel();
        assert_eq!(child.err(), Some(ContextError::Cancelled));
        assert!(parent.err().is_none());
        assert!(sibling.err().is_none());

        parent.cancel();
        assert_eq!(sibling.err(), Some(ContextError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn child_with_timeout_keeps_earlier_deadline() {
        let parent = ExecutionContext::with_timeout(Duration::from_secs(10));

        let shorter = parent.child_with_timeout(Duration::from_secs(3));
        assert_eq!(shorter.remaining(), Some(Duration::from_secs(3)));

        let longer = parent.child_with_timeout(Duration::from_secs(30));
        assert_eq!(longer.deadline(), parent.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn huge_timeout_saturates() {
        let ctx = ExecutionContext::with_timeout(Duration::MAX);
        assert_eq!(ctx.remaining(), Some(FAR_FUTURE));
        assert!(ctx.err().is_none());

        let child = ExecutionContext::background().child_with_timeout(Duration::MAX);
        assert_eq!(child.remaining(), Some(FAR_FUTURE));

        let bounded = ctx.child_with_timeout(Duration::from_secs(u64::MAX / 2));
        assert_eq!(bounded.deadline(), ctx.deadline());
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_is_interrupted_by_deadline() {
        let ctx = ExecutionContext::with_timeout(Duration::from_secs(1));
        let started = Instant::now();

        let result = ctx.sleep(Duration::from_secs(10)).await;

        assert_eq!(result, Err(ContextError::DeadlineExceeded));
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_is_interrupted_by_cancel() {
        let ctx = ExecutionContext::with_timeout(Duration::from_secs(60));
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });

        let result = ctx.sleep(Duration::from_secs(30)).await;
        assert_eq!(result, Err(ContextError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn run_refuses_to_start_when_done() {
        let ctx = ExecutionContext::background();
        ctx.cancel();

        let result = ctx.run(async { 42 }).await;
        assert_eq!(result, Err(ContextError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn run_returns_output() {
        let ctx = ExecutionContext::with_timeout(Duration::from_secs(1));
        assert_eq!(ctx.run(async { "ok" }).await, Ok("ok"));
    }
}
