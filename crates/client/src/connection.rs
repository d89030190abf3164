//! Shared connection to the service.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use secrecy::{ExposeSecret, SecretString};
use strato_resilience::RetryPolicy;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::clusters_mgmt::ClustersMgmtClient;
use crate::config::{ConnectionConfig, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, RetryTransport, Transport};

const APPLICATION_JSON: &str = "application/json";

/// Query parameters and extra headers attached to a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestParts {
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl ToString) {
        self.query.push((name.into(), value.to_string()));
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl ToString) {
        self.headers.push((name.into(), value.to_string()));
    }
}

/// Cheap-to-clone handle to the service.
///
/// All resource clients borrow nothing from the connection; they hold a
/// clone, so they can be moved into spawned tasks.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: Url,
    token: Option<SecretString>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.token.is_some())
            .field("transport", &self.inner.transport)
            .finish()
    }
}

impl Connection {
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Entry point of the clusters management service.
    pub fn clusters_mgmt(&self) -> ClustersMgmtClient {
        ClustersMgmtClient::new(self.clone())
    }

    /// Resolve `path` against the base URL and append `query`.
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let relative = path.trim_start_matches('/');
        let mut url = self
            .inner
            .base_url
            .join(relative)
            .map_err(|source| Error::InvalidUrl {
                url: path.to_owned(),
                source,
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Send one request and return the raw reply, whatever its status.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        parts: &RequestParts,
        body: Option<Bytes>,
    ) -> Result<HttpResponse> {
        let url = self.url_for(path, &parts.query)?;
        let headers = self.headers(parts, body.is_some())?;

        debug!(method = %method, url = %url, "sending request");
        let started = Instant::now();

        let request = HttpRequest {
            method: method.clone(),
            url,
            headers,
            body,
        };
        match self.inner.transport.round_trip(request).await {
            Ok(response) => {
                debug!(
                    method = %method,
                    path,
                    status = response.status.as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "received response"
                );
                Ok(response)
            }
            Err(err) => {
                warn!(method = %method, path, error = %err, "request failed");
                Err(err.into())
            }
        }
    }

    fn headers(&self, parts: &RequestParts, has_body: bool) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        if let Some(token) = &self.inner.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| Error::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                    message: "token contains characters not allowed in a header".into(),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &parts.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                message: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

/// Builder for [`Connection`].
///
/// The retry policy wraps the default reqwest transport. A transport passed
/// through [`transport`](Self::transport) is used as is.
#[derive(Debug, Default)]
pub struct ConnectionBuilder {
    url: Option<String>,
    token: Option<SecretString>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    transport: Option<Arc<dyn Transport>>,
}

impl ConnectionBuilder {
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<SecretString>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Apply every field of `config`, replacing earlier settings.
    #[must_use]
    pub fn from_config(mut self, config: &ConnectionConfig) -> Self {
        if let Some(url) = &config.url {
            self.url = Some(url.clone());
        }
        if let Some(token) = &config.token {
            self.token = Some(token.clone());
        }
        if let Some(user_agent) = &config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
        self.timeout = Some(config.timeout);
        self.connect_timeout = Some(config.connect_timeout);
        self.retry = Some(config.retry.clone());
        self
    }

    /// Validate the settings and create the connection.
    pub fn build(self) -> Result<Connection> {
        let raw_url = self.url.ok_or_else(|| Error::Config {
            message: "service URL is required".into(),
        })?;
        let mut base_url = Url::parse(&raw_url).map_err(|source| Error::InvalidUrl {
            url: raw_url.clone(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("unsupported URL scheme '{}'", base_url.scheme()),
            });
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let policy = self.retry.unwrap_or_default();
        policy.validate().map_err(|e| Error::Config {
            message: e.to_string(),
        })?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let defaults = ConnectionConfig::default();
                let base = ReqwestTransport::new(
                    self.timeout.unwrap_or(defaults.timeout),
                    self.connect_timeout.unwrap_or(defaults.connect_timeout),
                    self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT),
                )?;
                if policy.is_enabled() {
                    Arc::new(RetryTransport::new(base, policy)) as Arc<dyn Transport>
                } else {
                    Arc::new(base)
                }
            }
        };

        debug!(url = %base_url, "connection created");
        Ok(Connection {
            inner: Arc::new(Inner {
                base_url,
                token: self.token,
                transport,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn connection(url: &str) -> Connection {
        Connection::builder().url(url).build().unwrap()
    }

    #[test]
    fn url_is_required() {
        let err = Connection::builder().build().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn rejects_unparseable_url_and_scheme() {
        assert!(matches!(
            Connection::builder().url("not a url").build().unwrap_err(),
            Error::InvalidUrl { .. }
        ));
        assert!(matches!(
            Connection::builder().url("ftp://example.com").build().unwrap_err(),
            Error::Config { .. }
        ));
    }

    #[test]
    fn rejects_invalid_retry_policy() {
        let err = Connection::builder()
            .url("https://api.example.com")
            .retry(RetryPolicy::default().with_jitter(3.0))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn paths_are_joined_below_base_path() {
        let conn = connection("https://api.example.com/gateway");
        let url = conn.url_for("/api/clusters_mgmt/v1/clusters", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/gateway/api/clusters_mgmt/v1/clusters"
        );
    }

    #[test]
    fn query_is_appended() {
        let conn = connection("https://api.example.com");
        let query = vec![
            ("search".to_string(), "name like 'prod%'".to_string()),
            ("size".to_string(), "10".to_string()),
        ];
        let url = conn.url_for("api/clusters_mgmt/v1/clusters", &query).unwrap();
        assert_eq!(url.query(), Some("search=name+like+%27prod%25%27&size=10"));
    }

    #[test]
    fn headers_include_auth_and_overrides() {
        let conn = Connection::builder()
            .url("https://api.example.com")
            .token("s3cr3t")
            .build()
            .unwrap();
        let mut parts = RequestParts::default();
        parts.add_header("X-Request-Id", "abc");
        parts.add_header("Accept", "text/plain");

        let headers = conn.headers(&parts, true).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer s3cr3t");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(headers[ACCEPT], "text/plain");
        assert_eq!(headers["x-request-id"], "abc");
    }

    #[test]
    fn invalid_header_name_is_reported() {
        let conn = connection("https://api.example.com");
        let mut parts = RequestParts::default();
        parts.add_header("bad header", "x");
        let err = conn.headers(&parts, false).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { name, .. } if name == "bad header"));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let conn = Connection::builder()
            .url("https://api.example.com")
            .token("s3cr3t")
            .build()
            .unwrap();
        let rendered = format!("{conn:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("authenticated: true"));
    }
}
