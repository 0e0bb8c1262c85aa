//! In-memory document store for tests.
//!
//! Implements the same semantics as the hosted store, including revision
//! preconditions, plus fault injection so store outages can be exercised
//! without a network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Document, DocumentStore, Revision, StoreError};

#[derive(Debug, Clone)]
struct StoredDocument {
    fields: Map<String, Value>,
    revision: Revision,
}

/// In-process [`DocumentStore`] with revision semantics and fault injection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, StoredDocument>>,
    next_revision: AtomicU64,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent read fail with [`StoreError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn mint_revision(&self) -> Revision {
        let n = self.next_revision.fetch_add(1, Ordering::SeqCst);
        Revision::new(format!("rev-{n}"))
    }

    fn merge_into(target: &mut Map<String, Value>, fields: Map<String, Value>) {
        for (name, value) in fields {
            target.insert(name, value);
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read fault".to_string()));
        }

        let documents = self.documents.lock().expect("store lock");
        Ok(documents.get(key).map(|stored| Document {
            fields: stored.fields.clone(),
            revision: stored.revision.clone(),
        }))
    }

    async fn update(
        &self,
        key: &str,
        fields: Map<String, Value>,
        expected: Option<&Revision>,
    ) -> Result<Revision, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write fault".to_string()));
        }

        let revision = self.mint_revision();
        let mut documents = self.documents.lock().expect("store lock");

        if let Some(stored) = documents.get_mut(key) {
            if let Some(expected) = expected
                && stored.revision != *expected
            {
                return Err(StoreError::Conflict);
            }
            Self::merge_into(&mut stored.fields, fields);
            stored.revision = revision.clone();
            return Ok(revision);
        }

        // A precondition against a missing document can never hold.
        if expected.is_some() {
            return Err(StoreError::Conflict);
        }
        documents.insert(
            key.to_string(),
            StoredDocument {
                fields,
                revision: revision.clone(),
            },
        );

        Ok(revision)
    }

    async fn set(
        &self,
        key: &str,
        fields: Map<String, Value>,
        merge: bool,
    ) -> Result<Revision, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write fault".to_string()));
        }

        let revision = self.mint_revision();
        let mut documents = self.documents.lock().expect("store lock");

        if merge && let Some(stored) = documents.get_mut(key) {
            Self::merge_into(&mut stored.fields, fields);
            stored.revision = revision.clone();
            return Ok(revision);
        }

        documents.insert(
            key.to_string(),
            StoredDocument {
                fields,
                revision: revision.clone(),
            },
        );

        Ok(revision)
    }
}
