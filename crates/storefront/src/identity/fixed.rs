//! Fixed-table identity provider for tests.

use std::collections::HashMap;

use async_trait::async_trait;

use copperleaf_core::UserId;

use super::{AuthenticatedUser, IdentityError, IdentityProvider};

/// [`IdentityProvider`] backed by a fixed credential table.
#[derive(Default)]
pub struct StaticIdentityProvider {
    users: HashMap<String, (String, UserId)>,
}

impl StaticIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known user.
    #[must_use]
    pub fn with_user(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        uid: impl Into<String>,
    ) -> Self {
        self.users
            .insert(email.into(), (password.into(), UserId::new(uid.into())));
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthenticatedUser>, IdentityError> {
        Ok(self.users.get(email).and_then(|(expected, uid)| {
            if expected == password {
                Some(AuthenticatedUser { uid: uid.clone() })
            } else {
                None
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_known_credentials() {
        let provider = StaticIdentityProvider::new().with_user("ida@example.com", "pw", "u-1");

        let verified = provider
            .verify("ida@example.com", "pw")
            .await
            .expect("verify");
        assert_eq!(verified.expect("user").uid, UserId::new("u-1"));

        assert!(provider
            .verify("ida@example.com", "wrong")
            .await
            .expect("verify")
            .is_none());
        assert!(provider
            .verify("nobody@example.com", "pw")
            .await
            .expect("verify")
            .is_none());
    }
}
