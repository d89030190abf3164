//! Poll a resource until a condition holds.
//!
//! ```no_run
//! use std::time::Duration;
//! use strato_client::Connection;
//! use strato_client::clusters_mgmt::ClusterState;
//! use strato_resilience::ExecutionContext;
//!
//! # async fn example(conn: Connection) -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = ExecutionContext::with_timeout(Duration::from_secs(3600));
//! let ready = conn
//!     .clusters_mgmt()
//!     .v1()
//!     .clusters()
//!     .cluster("1a2b3c")
//!     .poll()
//!     .interval(Duration::from_secs(30))
//!     .status(200)
//!     .predicate(|response| {
//!         response.body().and_then(|c| c.state) == Some(ClusterState::Ready)
//!     })
//!     .start(&ctx)
//!     .await?;
//! println!("ready after {} attempts", ready.attempts());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use http::HeaderMap;
use strato_resilience::{Acceptance, ExecutionContext, Observation, PollError, poll_context};
use tracing::debug;

use crate::error::{ApiError, Error};
use crate::request::{GetRequest, GetResponse};
use crate::resource::{Envelope, Resource};

/// A get request sent repeatedly until its response is accepted.
///
/// The interval defaults to zero and must be set before [`start`](Self::start).
pub struct PollRequest<R> {
    request: GetRequest<R>,
    interval: Duration,
    acceptance: Acceptance<GetResponse<R>>,
}

impl<R: Resource> PollRequest<R> {
    pub(crate) fn new(request: GetRequest<R>) -> Self {
        Self {
            request,
            interval: Duration::ZERO,
            acceptance: Acceptance::new(),
        }
    }

    /// Query parameter sent with every attempt.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.request = self.request.parameter(name, value);
        self
    }

    /// Header sent with every attempt.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Time to wait between attempts.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Accept responses with this status. Without any, every status is accepted.
    #[must_use]
    pub fn status(mut self, code: u16) -> Self {
        self.acceptance.add_status(code);
        self
    }

    /// Accept only responses for which `predicate` returns `true`.
    #[must_use]
    pub fn predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&GetResponse<R>) -> bool + Send + Sync + 'static,
    {
        self.acceptance.add_predicate(predicate);
        self
    }

    /// Poll until a response is accepted, a request fails or `ctx` finishes.
    ///
    /// `ctx` must carry a deadline and the interval must be non-zero; neither
    /// is defaulted.
    pub async fn start(self, ctx: &ExecutionContext) -> Result<PollResponse<R>, PollError<Error>> {
        let Self {
            request,
            interval,
            acceptance,
        } = self;
        debug!(path = request.path(), ?interval, ?acceptance, "starting poll");

        let request = &request;
        let outcome = poll_context(ctx, interval, &acceptance, || async move {
            let response = request.send().await?;
            Ok::<_, Error>(Observation::new(response.status(), response))
        })
        .await?;

        Ok(PollResponse {
            response: outcome.value,
            attempts: outcome.attempts,
            elapsed: outcome.elapsed,
        })
    }
}

impl<R> fmt::Debug for PollRequest<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollRequest")
            .field("request", &self.request)
            .field("interval", &self.interval)
            .field("acceptance", &self.acceptance)
            .finish()
    }
}

/// The accepted response of a poll.
#[derive(Debug, Clone)]
pub struct PollResponse<R> {
    response: GetResponse<R>,
    attempts: u32,
    elapsed: Duration,
}

impl<R> PollResponse<R> {
    /// Status of the accepted response.
    pub fn status(&self) -> u16 {
        self.response.status()
    }

    /// Headers of the accepted response.
    pub fn header(&self) -> &HeaderMap {
        self.response.header()
    }

    /// Decoded body, if the accepted response was a success.
    pub fn body(&self) -> Option<&Envelope<R>> {
        self.response.body()
    }

    /// Decoded error, if the accepted response was an error status.
    pub fn error(&self) -> Option<&ApiError> {
        self.response.error()
    }

    /// Number of requests sent, including the accepted one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Time from the first request until acceptance.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// The accepted response itself.
    pub fn into_response(self) -> GetResponse<R> {
        self.response
    }
}
