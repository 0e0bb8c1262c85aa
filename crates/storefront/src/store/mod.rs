//! Hosted document database collaborator.
//!
//! All durable state lives in a hosted document database: one document per
//! user, keyed by user ID. This module defines the capability trait the rest
//! of the application programs against, the HTTP implementation used in
//! production, an in-memory implementation for tests, and the typed cart
//! repository layered on top.
//!
//! Every document carries an opaque revision token. Writes may pass the
//! revision they read as a precondition; a stale revision is rejected with
//! [`StoreError::Conflict`] instead of silently overwriting a concurrent
//! edit.

mod carts;
mod http;
mod memory;

pub use carts::{CartRepository, VersionedCart};
pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response or field payload could not be (de)serialized.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A write precondition failed: the document changed since it was read.
    #[error("revision conflict")]
    Conflict,

    /// The store rejected the request or is unreachable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Opaque per-document version token.
///
/// Returned on every read and write; passing it back as a write precondition
/// detects concurrent modification.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A document as returned by the store.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Document {
    /// Top-level fields of the document.
    pub fields: Map<String, Value>,
    /// Revision the fields were read at.
    pub revision: Revision,
}

/// Keyed document access: `get` / `update` (merge) / `set`.
///
/// Implementations are handed around as `Arc<dyn DocumentStore>` so route
/// handlers and services stay testable against [`MemoryDocumentStore`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by key. Absent documents are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError>;

    /// Merge `fields` into the document at `key`, creating it if absent.
    ///
    /// When `expected` is given the write only succeeds if the document is
    /// still at that revision; otherwise it fails with
    /// [`StoreError::Conflict`].
    async fn update(
        &self,
        key: &str,
        fields: Map<String, Value>,
        expected: Option<&Revision>,
    ) -> Result<Revision, StoreError>;

    /// Write a document unconditionally: merge into or fully replace
    /// whatever exists at `key`, creating it if absent.
    async fn set(
        &self,
        key: &str,
        fields: Map<String, Value>,
        merge: bool,
    ) -> Result<Revision, StoreError>;
}
