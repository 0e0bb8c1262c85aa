//! Hosted identity service collaborator.
//!
//! The storefront never sees password hashes or issues tokens itself:
//! credential verification is delegated to the hosted identity service, and
//! the only identity fact this application holds is the verified user ID in
//! the session. Route handlers read it through the extractors in
//! `crate::middleware`.

mod fixed;
mod http;

pub use fixed::StaticIdentityProvider;
pub use http::HttpIdentityProvider;

use async_trait::async_trait;

use copperleaf_core::UserId;

/// Errors from identity service operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response payload could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The identity service rejected the request or is unreachable.
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// A user the identity service vouched for.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Stable user ID issued by the identity service.
    pub uid: UserId,
}

/// Credential verification capability.
///
/// `Ok(None)` means the credentials were well-formed but wrong; errors are
/// reserved for the service itself misbehaving.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthenticatedUser>, IdentityError>;
}
