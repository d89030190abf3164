//! Generic clients for single resources and collections.
//!
//! One implementation serves every resource type: the type parameter picks
//! the body model, the path picks the server side object.

use std::fmt;
use std::marker::PhantomData;

use crate::connection::Connection;
use crate::poll::PollRequest;
use crate::request::{AddRequest, DeleteRequest, GetRequest, ListRequest, UpdateRequest};
use crate::resource::Resource;

/// Client for one resource, addressed by its path.
pub struct ResourceClient<R> {
    conn: Connection,
    path: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(conn: Connection, path: impl Into<String>) -> Self {
        Self {
            conn,
            path: path.into(),
            _resource: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&self) -> GetRequest<R> {
        GetRequest::new(self.conn.clone(), self.path.clone())
    }

    pub fn update(&self) -> UpdateRequest<R> {
        UpdateRequest::new(self.conn.clone(), self.path.clone())
    }

    pub fn delete(&self) -> DeleteRequest<R> {
        DeleteRequest::new(self.conn.clone(), self.path.clone())
    }

    /// Repeat [`get`](Self::get) until a condition holds.
    pub fn poll(&self) -> PollRequest<R> {
        PollRequest::new(self.get())
    }

    /// Client for a sub-resource below this one.
    pub fn child<S: Resource>(&self, segment: &str) -> ResourceClient<S> {
        ResourceClient::new(self.conn.clone(), join(&self.path, segment))
    }
}

/// Client for a collection of resources.
pub struct CollectionClient<R> {
    conn: Connection,
    path: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for CollectionClient<R> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R> fmt::Debug for CollectionClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionClient")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> CollectionClient<R> {
    pub fn new(conn: Connection, path: impl Into<String>) -> Self {
        Self {
            conn,
            path: path.into(),
            _resource: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn list(&self) -> ListRequest<R> {
        ListRequest::new(self.conn.clone(), self.path.clone())
    }

    pub fn add(&self) -> AddRequest<R> {
        AddRequest::new(self.conn.clone(), self.path.clone())
    }

    /// Client for the member with the given id.
    pub fn item(&self, id: &str) -> ResourceClient<R> {
        ResourceClient::new(self.conn.clone(), join(&self.path, &escape_segment(id)))
    }
}

fn join(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn escape_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
