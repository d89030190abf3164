//! Resource envelope and list pages.
//!
//! Every object the service returns shares the same outer shape: optional
//! `kind`, `id` and `href`, followed by the resource specific fields. A
//! `kind` ending in `Link` marks a reference that carries nothing but the
//! identity fields.

use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A typed resource body.
pub trait Resource: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    /// Value of the `kind` field for full objects.
    const KIND: &'static str;
}

const LINK_SUFFIX: &str = "Link";

/// Identity fields plus a typed body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Resource> Envelope<T> {
    /// Full object of kind [`Resource::KIND`] without identity.
    pub fn new(body: T) -> Self {
        Self {
            kind: Some(T::KIND.to_owned()),
            id: None,
            href: None,
            body,
        }
    }
}

impl<T: Resource + Default> Envelope<T> {
    /// Reference to an existing object by id.
    pub fn link(id: impl Into<String>) -> Self {
        Self {
            kind: Some(format!("{}{LINK_SUFFIX}", T::KIND)),
            id: Some(id.into()),
            href: None,
            body: T::default(),
        }
    }
}

impl<T> Envelope<T> {
    /// Whether this is only a reference to the object.
    pub fn is_link(&self) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|kind| kind.ends_with(LINK_SUFFIX))
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn into_body(self) -> T {
        self.body
    }
}

impl<T> Deref for Envelope<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.body
    }
}

impl<T> DerefMut for Envelope<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.body
    }
}

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// 1-based page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Number of items on this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Number of items in the whole collection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default = "Vec::new")]
    pub items: Vec<Envelope<T>>,
}

impl<T> Page<T> {
    pub fn items(&self) -> &[Envelope<T>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether pages after this one hold more items, given the page size
    /// that was requested.
    pub fn has_more(&self, page_size: u32) -> bool {
        match (self.page, self.total) {
            (Some(page), Some(total)) => u64::from(page) * u64::from(page_size) < u64::from(total),
            _ => false,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = Envelope<T>;
    type IntoIter = std::vec::IntoIter<Envelope<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
