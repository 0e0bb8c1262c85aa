//! HTTP client for the hosted document database.
//!
//! Documents live at `{base_url}/v1/{collection}/{key}`. Reads return the
//! fields plus a revision token; writes return the new revision. Revision
//! preconditions travel in the `If-Match` header, and a stale revision is
//! answered with `409` or `412`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::config::DocStoreConfig;

use super::{Document, DocumentStore, Revision, StoreError};

/// Request timeout for document operations.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Acknowledgement body returned by write endpoints.
#[derive(Debug, serde::Deserialize)]
struct WriteAck {
    revision: Revision,
}

/// Document database client backed by the hosted HTTP API.
pub struct HttpDocumentStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    api_key: secrecy::SecretString,
}

impl HttpDocumentStore {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &DocStoreConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn document_url(&self, key: &str) -> String {
        format!("{}/v1/{}/{key}", self.base_url, self.collection)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.api_key.expose_secret())
    }

    /// Map a write response to its new revision.
    async fn read_ack(response: reqwest::Response) -> Result<Revision, StoreError> {
        match response.status() {
            status if status.is_success() => {
                let ack: WriteAck = response.json().await?;
                Ok(ack.revision)
            }
            status if status.as_u16() == 409 || status.as_u16() == 412 => {
                Err(StoreError::Conflict)
            }
            status => Err(StoreError::Unavailable(format!(
                "unexpected status {status} on write"
            ))),
        }
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .authorize(self.client.get(self.document_url(key)))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let document: Document = response.json().await?;
                debug!(revision = document.revision.as_str(), "document fetched");
                Ok(Some(document))
            }
            status if status.as_u16() == 404 => Ok(None),
            status => Err(StoreError::Unavailable(format!(
                "unexpected status {status} on get"
            ))),
        }
    }

    #[instrument(skip(self, fields))]
    async fn update(
        &self,
        key: &str,
        fields: Map<String, Value>,
        expected: Option<&Revision>,
    ) -> Result<Revision, StoreError> {
        let mut request = self
            .authorize(self.client.patch(self.document_url(key)))
            .json(&serde_json::json!({ "fields": fields }));

        if let Some(revision) = expected {
            request = request.header("If-Match", revision.as_str());
        }

        Self::read_ack(request.send().await?).await
    }

    #[instrument(skip(self, fields))]
    async fn set(
        &self,
        key: &str,
        fields: Map<String, Value>,
        merge: bool,
    ) -> Result<Revision, StoreError> {
        let request = self
            .authorize(self.client.put(self.document_url(key)))
            .query(&[("merge", merge)])
            .json(&serde_json::json!({ "fields": fields }));

        Self::read_ack(request.send().await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn store() -> HttpDocumentStore {
        HttpDocumentStore::new(&DocStoreConfig {
            base_url: "https://docs.test".to_string(),
            api_key: SecretString::from("key"),
            collection: "users".to_string(),
        })
        .expect("client")
    }

    #[test]
    fn document_url_joins_collection_and_key() {
        assert_eq!(store().document_url("u-1"), "https://docs.test/v1/users/u-1");
    }
}
