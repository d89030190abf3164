//! # Strato Client
//!
//! Typed REST client for the Strato cluster management service.
//!
//! - [`Connection`]: base URL, credentials and the [`Transport`] every request
//!   goes through.
//! - [`ResourceClient`] / [`CollectionClient`]: one generic implementation of
//!   get, list, add, update and delete for any [`Resource`].
//! - [`PollRequest`]: repeat a get until the response satisfies a condition,
//!   bounded by an [`ExecutionContext`](strato_resilience::ExecutionContext).
//! - [`clusters_mgmt`]: typed entry points and models of the clusters API.
//!
//! ```no_run
//! use strato_client::Connection;
//!
//! # async fn example() -> Result<(), strato_client::Error> {
//! let conn = Connection::builder()
//!     .url("https://api.example.com")
//!     .token("my-token")
//!     .build()?;
//!
//! let page = conn
//!     .clusters_mgmt()
//!     .v1()
//!     .clusters()
//!     .list()
//!     .search("state = 'ready'")
//!     .size(20)
//!     .send()
//!     .await?
//!     .into_result()?;
//!
//! for cluster in page {
//!     println!("{:?} {:?}", cluster.id(), cluster.name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod client;
pub mod clusters_mgmt;
mod config;
mod connection;
mod error;
mod poll;
mod request;
mod resource;
pub mod transport;

pub use client::{CollectionClient, ResourceClient};
pub use config::{ConnectionConfig, DEFAULT_USER_AGENT};
pub use connection::{Connection, ConnectionBuilder, RequestParts};
pub use error::{ApiError, Error, Result};
pub use poll::{PollRequest, PollResponse};
pub use request::{
    AddRequest, DeleteRequest, DeleteResponse, GetRequest, GetResponse, ListRequest,
    ListResponse, Response, UpdateRequest,
};
pub use resource::{Envelope, Page, Resource};
pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, RetryTransport, Transport, TransportError,
};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::clusters_mgmt::{Cluster, ClusterState, ClusterStatus};
    pub use crate::{Connection, Envelope, Error, GetResponse, Resource};
    pub use strato_resilience::{ExecutionContext, PollError};
}
