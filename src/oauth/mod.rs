//! Sign in with an external identity provider.
mod google;

pub use google::*;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::blog::User;
use crate::error::Result;
use crate::store::{Store, new_id};

/// Profile returned by the identity provider.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ExternalProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Port for the OAuth2 authorization code flow.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Where to send the browser to start the consent flow.
    fn authorization_url(&self) -> String;

    /// Exchange an authorization `code` for the user profile.
    async fn exchange(&self, code: &str) -> Result<ExternalProfile>;
}

/// Link external identities to local users.
#[derive(Clone)]
pub struct OAuthBridge {
    provider: Arc<dyn IdentityProvider>,
    store: Store,
}

impl OAuthBridge {
    /// Create a new [`OAuthBridge`].
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Store) -> Self {
        Self { provider, store }
    }

    pub fn initiate(&self) -> String {
        self.provider.authorization_url()
    }

    /// Finish the flow and return the signed-in user.
    ///
    /// An unknown external ID creates a user, a known one gets its name and
    /// picture refreshed.
    pub async fn callback(&self, code: &str) -> Result<User> {
        let profile = self.provider.exchange(code).await?;

        self.store
            .write(|document| {
                if let Some(user) =
                    document.user_by_external_id_mut(&profile.id)
                {
                    user.name = profile.name;
                    user.picture = profile.picture;
                    return Ok(user.clone());
                }

                let user = User {
                    id: new_id(),
                    google_id: profile.id,
                    name: profile.name,
                    email: profile.email,
                    picture: profile.picture,
                };
                tracing::info!(user_id = %user.id, "new user signed in");

                document.users.push(user.clone());
                Ok(user)
            })
            .await
    }
}

/// Provider answering every code with the same profile.
#[cfg(test)]
pub struct StaticProvider {
    pub profile: std::sync::Mutex<ExternalProfile>,
}

#[cfg(test)]
impl StaticProvider {
    pub fn new(profile: ExternalProfile) -> Self {
        Self {
            profile: std::sync::Mutex::new(profile),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl IdentityProvider for StaticProvider {
    fn authorization_url(&self) -> String {
        "https://provider.test/auth?response_type=code".to_owned()
    }

    async fn exchange(&self, code: &str) -> Result<ExternalProfile> {
        if code == "bad" {
            return Err(crate::error::ServerError::UpstreamAuth {
                details: "invalid_grant".into(),
                source: None,
            });
        }

        Ok(self.profile.lock().unwrap().clone())
    }
}
