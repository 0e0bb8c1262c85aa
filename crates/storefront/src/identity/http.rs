//! HTTP client for the hosted identity service.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::instrument;

use copperleaf_core::UserId;

use crate::config::IdentityConfig;

use super::{AuthenticatedUser, IdentityError, IdentityProvider};

/// Request timeout for identity operations.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Successful verification response body.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    uid: String,
}

/// Identity client backed by the hosted verification endpoint.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: secrecy::SecretString,
}

impl HttpIdentityProvider {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &IdentityConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, password))]
    async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let response = self
            .client
            .post(format!("{}/v1/credentials:verify", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let verified: VerifyResponse = response.json().await?;
                Ok(Some(AuthenticatedUser {
                    uid: UserId::new(verified.uid),
                }))
            }
            // Wrong email or password - not an error, just no identity.
            status if status.as_u16() == 401 || status.as_u16() == 404 => Ok(None),
            status => Err(IdentityError::Unavailable(format!(
                "unexpected status {status} on verify"
            ))),
        }
    }
}
