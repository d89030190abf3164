//! Poll adapter and retrying transport against a mock server.
//!
//! These tests talk to a real socket, so they run on the real clock with
//! short intervals.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use strato_client::clusters_mgmt::ClusterState;
use strato_client::{Connection, Error};
use strato_resilience::{ExecutionContext, PollError, RetryPolicy};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLUSTER: &str = "/api/clusters_mgmt/v1/clusters/abc";
const INTERVAL: Duration = Duration::from_millis(20);

fn connect(server: &MockServer) -> Connection {
    Connection::builder()
        .url(server.uri())
        .retry(RetryPolicy::disabled())
        .build()
        .unwrap()
}

fn cluster(state: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "kind": "Cluster",
        "id": "abc",
        "state": state
    }))
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "kind": "Error",
        "code": "CLUSTERS-MGMT-404",
        "reason": "Cluster 'abc' not found"
    }))
}

#[tokio::test]
async fn polls_until_status_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(not_found())
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(cluster("installing"))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));
    let response = connect(&server)
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .interval(INTERVAL)
        .status(200)
        .start(&ctx)
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.attempts(), 3);
    assert!(response.elapsed() >= INTERVAL * 2);
    assert_eq!(response.body().and_then(|c| c.state), Some(ClusterState::Installing));
}

#[tokio::test]
async fn predicates_see_the_typed_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(cluster("installing"))
        .up_to_n_times(3)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(cluster("ready"))
        .mount(&server)
        .await;

    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));
    let response = connect(&server)
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .interval(INTERVAL)
        .status(200)
        .predicate(|r| r.body().is_some_and(|c| c.id() == Some("abc")))
        .predicate(|r| r.body().and_then(|c| c.state) == Some(ClusterState::Ready))
        .start(&ctx)
        .await
        .unwrap();

    assert_eq!(response.attempts(), 4);
}

#[tokio::test]
async fn parameters_and_headers_are_sent_on_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .and(query_param("fields", "state"))
        .and(header("x-poll", "1"))
        .respond_with(cluster("installing"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .and(query_param("fields", "state"))
        .and(header("x-poll", "1"))
        .respond_with(cluster("ready"))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));
    let response = connect(&server)
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .parameter("fields", "state")
        .header("X-Poll", 1)
        .interval(INTERVAL)
        .predicate(|r| r.body().and_then(|c| c.state) == Some(ClusterState::Ready))
        .start(&ctx)
        .await
        .unwrap();

    assert_eq!(response.attempts(), 2);
}

#[tokio::test]
async fn zero_interval_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(cluster("ready"))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));
    let err = connect(&server)
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .status(200)
        .start(&ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::InvalidInterval { .. }));
}

#[tokio::test]
async fn context_without_deadline_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(cluster("ready"))
        .expect(0)
        .mount(&server)
        .await;

    let err = connect(&server)
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .interval(INTERVAL)
        .start(&ExecutionContext::background())
        .await
        .unwrap_err();

    assert!(matches!(err, PollError::MissingDeadline));
}

#[tokio::test]
async fn deadline_ends_a_poll_that_never_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(cluster("installing"))
        .mount(&server)
        .await;

    let ctx = ExecutionContext::with_timeout(Duration::from_millis(150));
    let err = connect(&server)
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .interval(INTERVAL)
        .predicate(|r| r.body().and_then(|c| c.state) == Some(ClusterState::Ready))
        .start(&ctx)
        .await
        .unwrap_err();

    assert!(err.is_deadline_exceeded());

    tokio::time::sleep(INTERVAL).await;
    let calls = server.received_requests().await.unwrap().len();
    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(server.received_requests().await.unwrap().len(), calls);
}

#[tokio::test]
async fn not_found_can_be_the_goal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(cluster("uninstalling"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));
    let response = connect(&server)
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .interval(INTERVAL)
        .status(404)
        .start(&ctx)
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.attempts(), 3);
    assert!(response.error().is_some_and(|e| e.is_not_found()));
}

#[tokio::test]
async fn transport_failure_stops_the_poll() {
    // Nothing listens on the port once the listener is dropped.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let conn = Connection::builder()
        .url(format!("http://{addr}"))
        .retry(RetryPolicy::disabled())
        .build()
        .unwrap();

    let ctx = ExecutionContext::with_timeout(Duration::from_secs(10));
    let err = conn
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .poll()
        .interval(INTERVAL)
        .status(200)
        .start(&ctx)
        .await
        .unwrap_err();

    match err {
        PollError::Transport { attempt, source } => {
            assert_eq!(attempt, 1);
            assert!(matches!(source, Error::Transport(_)));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn retry_transport_hides_unavailable_replies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CLUSTER))
        .respond_with(cluster("ready"))
        .expect(1)
        .mount(&server)
        .await;

    let conn = Connection::builder()
        .url(server.uri())
        .retry(
            RetryPolicy::default()
                .with_limit(3)
                .with_interval(Duration::from_millis(10))
                .with_jitter(0.0),
        )
        .build()
        .unwrap();

    let response = conn
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .get()
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn retry_limit_returns_last_reply() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(2)
        .mount(&server)
        .await;

    let conn = Connection::builder()
        .url(server.uri())
        .retry(
            RetryPolicy::default()
                .with_limit(1)
                .with_interval(Duration::from_millis(10)),
        )
        .build()
        .unwrap();

    let response = conn
        .clusters_mgmt()
        .v1()
        .clusters()
        .cluster("abc")
        .get()
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
    assert_eq!(
        response.error().and_then(|e| e.reason.as_deref()),
        Some("maintenance")
    );
}
