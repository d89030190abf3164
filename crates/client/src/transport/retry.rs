use async_trait::async_trait;
use http::StatusCode;
use strato_resilience::RetryPolicy;
use tracing::debug;

use super::{HttpRequest, HttpResponse, Transport, TransportError};

/// Retries throttled and unavailable replies, and connection failures of
/// idempotent requests, according to a [`RetryPolicy`].
#[derive(Debug)]
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let idempotent = request.is_idempotent();
        let request = &request;
        self.policy
            .execute(
                || self.inner.round_trip(request.clone()),
                |outcome| should_retry(outcome, idempotent),
            )
            .await
    }
}

fn should_retry(outcome: &Result<HttpResponse, TransportError>, idempotent: bool) -> bool {
    match outcome {
        Ok(response) => {
            let retry = matches!(
                response.status,
                StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
            );
            if retry {
                debug!(status = response.status.as_u16(), "retryable response status");
            }
            retry
        }
        Err(err) => idempotent && err.is_retryable(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use http::Method;
    use url::Url;

    use super::*;

    /// Replays canned outcomes and counts calls.
    #[derive(Debug)]
    struct Scripted {
        outcomes: Mutex<Vec<Result<HttpResponse, TransportError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(mut outcomes: Vec<Result<HttpResponse, TransportError>>) -> Self {
            outcomes.reverse();
            Self {
                outcomes: Mutex::new(outcomes),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn round_trip(&self, _: HttpRequest) -> Result<HttpResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(HttpResponse::new(StatusCode::OK, "")))
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::default()
            .with_limit(3)
            .with_interval(Duration::from_millis(10))
            .with_jitter(0.0)
    }

    fn request(method: Method) -> HttpRequest {
        HttpRequest::new(method, Url::parse("http://localhost/api").unwrap())
    }

    fn timeout() -> Result<HttpResponse, TransportError> {
        Err(TransportError::Timeout {
            url: "http://localhost/api".into(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn retries_unavailable_for_any_method() {
        let transport = RetryTransport::new(
            Scripted::new(vec![Ok(HttpResponse::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "",
            ))]),
            policy(),
        );

        let response = transport.round_trip(request(Method::POST)).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(transport.inner().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_timeouts_of_idempotent_requests() {
        let transport = RetryTransport::new(Scripted::new(vec![timeout(), timeout()]), policy());

        let response = transport.round_trip(request(Method::GET)).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(transport.inner().calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_timeouts_of_posts() {
        let transport = RetryTransport::new(Scripted::new(vec![timeout()]), policy());

        let err = transport.round_trip(request(Method::POST)).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
        assert_eq!(transport.inner().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn client_errors_are_returned_as_is() {
        let transport = RetryTransport::new(
            Scripted::new(vec![Ok(HttpResponse::new(StatusCode::NOT_FOUND, ""))]),
            policy(),
        );

        let response = transport.round_trip(request(Method::GET)).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(transport.inner().calls(), 1);
    }
}
