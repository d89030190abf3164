//! Typed requests and responses of the resource clients.

use std::fmt;
use std::marker::PhantomData;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::connection::{Connection, RequestParts};
use crate::error::{ApiError, Error, Result};
use crate::resource::{Envelope, Page, Resource};
use crate::transport::HttpResponse;

/// Reply to a single request.
///
/// A reply with an error status is still a response: its [`error`](Self::error)
/// holds the decoded [`ApiError`] and its body is empty.
#[derive(Debug, Clone)]
pub struct Response<B> {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<B>,
    error: Option<ApiError>,
}

/// Reply of a get, add or update request.
pub type GetResponse<R> = Response<Envelope<R>>;
/// Reply of a list request.
pub type ListResponse<R> = Response<Page<R>>;
/// Reply of a delete request.
pub type DeleteResponse = Response<()>;

impl<B: DeserializeOwned> Response<B> {
    pub(crate) fn decode(raw: HttpResponse) -> Result<Self> {
        let status = raw.status;
        if !status.is_success() {
            return Ok(Self {
                status,
                headers: raw.headers,
                body: None,
                error: Some(ApiError::from_body(status.as_u16(), &raw.body)),
            });
        }

        let body = if raw.body.iter().all(u8::is_ascii_whitespace) {
            serde_json::from_slice::<B>(b"null").ok()
        } else {
            let decoded = serde_json::from_slice::<B>(&raw.body).map_err(|source| Error::Decode {
                status: status.as_u16(),
                source,
            })?;
            Some(decoded)
        };

        Ok(Self {
            status,
            headers: raw.headers,
            body,
            error: None,
        })
    }
}

impl Response<()> {
    /// Reply whose success body, if any, is ignored.
    pub(crate) fn discard(raw: HttpResponse) -> Self {
        let status = raw.status;
        let error = (!status.is_success()).then(|| ApiError::from_body(status.as_u16(), &raw.body));
        Self {
            status,
            headers: raw.headers,
            body: error.is_none().then_some(()),
            error,
        }
    }
}

impl<B> Response<B> {
    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn header(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded body of a successful reply.
    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Decoded error of a failed reply.
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn into_body(self) -> Option<B> {
        self.body
    }

    /// The body, or the error the service answered with.
    pub fn into_result(self) -> Result<B> {
        if let Some(error) = self.error {
            return Err(Error::Api(error));
        }
        self.body.ok_or(Error::EmptyBody {
            status: self.status.as_u16(),
        })
    }
}

macro_rules! request_parts {
    ($ty:ident) => {
        impl<R: Resource> $ty<R> {
            /// Add a query parameter.
            #[must_use]
            pub fn parameter(mut self, name: impl Into<String>, value: impl ToString) -> Self {
                self.parts.add_parameter(name, value);
                self
            }

            /// Add a request header.
            #[must_use]
            pub fn header(mut self, name: impl Into<String>, value: impl ToString) -> Self {
                self.parts.add_header(name, value);
                self
            }

            /// Path the request is sent to.
            pub fn path(&self) -> &str {
                &self.path
            }
        }

        impl<R> fmt::Debug for $ty<R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("path", &self.path)
                    .field("parts", &self.parts)
                    .finish_non_exhaustive()
            }
        }
    };
}

fn encode<R: Resource>(body: Option<&R>) -> Result<Bytes> {
    let body = body.ok_or_else(|| Error::Config {
        message: "request body is required".into(),
    })?;
    let envelope = Envelope {
        kind: Some(R::KIND.to_owned()),
        id: None,
        href: None,
        body,
    };
    serde_json::to_vec(&envelope).map(Bytes::from).map_err(Error::Encode)
}

/// Fetch one resource.
pub struct GetRequest<R> {
    conn: Connection,
    path: String,
    parts: RequestParts,
    _resource: PhantomData<fn() -> R>,
}

request_parts!(GetRequest);

impl<R: Resource> GetRequest<R> {
    pub(crate) fn new(conn: Connection, path: String) -> Self {
        Self {
            conn,
            path,
            parts: RequestParts::default(),
            _resource: PhantomData,
        }
    }

    /// Send the request. Can be called any number of times.
    pub async fn send(&self) -> Result<GetResponse<R>> {
        let raw = self.conn.send(Method::GET, &self.path, &self.parts, None).await?;
        Response::decode(raw)
    }
}

/// Fetch one page of a collection.
pub struct ListRequest<R> {
    conn: Connection,
    path: String,
    parts: RequestParts,
    _resource: PhantomData<fn() -> R>,
}

request_parts!(ListRequest);

impl<R: Resource> ListRequest<R> {
    pub(crate) fn new(conn: Connection, path: String) -> Self {
        Self {
            conn,
            path,
            parts: RequestParts::default(),
            _resource: PhantomData,
        }
    }

    /// 1-based page number.
    #[must_use]
    pub fn page(self, page: u32) -> Self {
        self.parameter("page", page)
    }

    /// Maximum number of items per page.
    #[must_use]
    pub fn size(self, size: u32) -> Self {
        self.parameter("size", size)
    }

    /// Server side filter, e.g. `name like 'prod-%'`.
    #[must_use]
    pub fn search(self, search: impl ToString) -> Self {
        self.parameter("search", search)
    }

    /// Server side ordering, e.g. `creation_timestamp desc`.
    #[must_use]
    pub fn order(self, order: impl ToString) -> Self {
        self.parameter("order", order)
    }

    pub async fn send(&self) -> Result<ListResponse<R>> {
        let raw = self.conn.send(Method::GET, &self.path, &self.parts, None).await?;
        Response::decode(raw)
    }
}

/// Create a resource in a collection.
pub struct AddRequest<R> {
    conn: Connection,
    path: String,
    parts: RequestParts,
    body: Option<R>,
}

request_parts!(AddRequest);

impl<R: Resource> AddRequest<R> {
    pub(crate) fn new(conn: Connection, path: String) -> Self {
        Self {
            conn,
            path,
            parts: RequestParts::default(),
            body: None,
        }
    }

    #[must_use]
    pub fn body(mut self, body: R) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(&self) -> Result<GetResponse<R>> {
        let body = encode(self.body.as_ref())?;
        let raw = self
            .conn
            .send(Method::POST, &self.path, &self.parts, Some(body))
            .await?;
        Response::decode(raw)
    }
}

/// Change some fields of a resource. Unset fields are left untouched.
pub struct UpdateRequest<R> {
    conn: Connection,
    path: String,
    parts: RequestParts,
    body: Option<R>,
}

request_parts!(UpdateRequest);

impl<R: Resource> UpdateRequest<R> {
    pub(crate) fn new(conn: Connection, path: String) -> Self {
        Self {
            conn,
            path,
            parts: RequestParts::default(),
            body: None,
        }
    }

    #[must_use]
    pub fn body(mut self, body: R) -> Self {
        self.body = Some(body);
        self
    }

    pub async fn send(&self) -> Result<GetResponse<R>> {
        let body = encode(self.body.as_ref())?;
        let raw = self
            .conn
            .send(Method::PATCH, &self.path, &self.parts, Some(body))
            .await?;
        Response::decode(raw)
    }
}

/// Delete a resource.
pub struct DeleteRequest<R> {
    conn: Connection,
    path: String,
    parts: RequestParts,
    _resource: PhantomData<fn() -> R>,
}

request_parts!(DeleteRequest);

impl<R: Resource> DeleteRequest<R> {
    pub(crate) fn new(conn: Connection, path: String) -> Self {
        Self {
            conn,
            path,
            parts: RequestParts::default(),
            _resource: PhantomData,
        }
    }

    pub async fn send(&self) -> Result<DeleteResponse> {
        let raw = self
            .conn
            .send(Method::DELETE, &self.path, &self.parts, None)
            .await?;
        Ok(Response::discard(raw))
    }
}
