//! Google OAuth2 identity provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::Google;
use crate::error::{Result, ServerError};
use crate::oauth::{ExternalProfile, IdentityProvider};

const AUTHORIZATION_ENDPOINT: &str =
    "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str =
    "https://www.googleapis.com/oauth2/v1/userinfo?alt=json";
const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
];
pub const CALLBACK_PATH: &str = "/api/auth/google/callback";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google implementation of [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorization_endpoint: String,
    token_endpoint: String,
    userinfo_endpoint: String,
}

impl GoogleProvider {
    /// Create a new [`GoogleProvider`] for the server at `server_url`.
    pub fn new(config: &Google, server_url: &str) -> Self {
        Self {
            client: Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: format!(
                "{}{CALLBACK_PATH}",
                server_url.trim_end_matches('/')
            ),
            authorization_endpoint: config
                .authorization_endpoint
                .clone()
                .unwrap_or_else(|| AUTHORIZATION_ENDPOINT.to_owned()),
            token_endpoint: config
                .token_endpoint
                .clone()
                .unwrap_or_else(|| TOKEN_ENDPOINT.to_owned()),
            userinfo_endpoint: config
                .userinfo_endpoint
                .clone()
                .unwrap_or_else(|| USERINFO_ENDPOINT.to_owned()),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self) -> String {
        let Ok(mut url) = Url::parse(&self.authorization_endpoint) else {
            tracing::error!(
                endpoint = %self.authorization_endpoint,
                "invalid authorization endpoint"
            );
            return self.authorization_endpoint.clone();
        };

        url.query_pairs_mut()
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("client_id", &self.client_id)
            .append_pair("access_type", "offline")
            .append_pair("response_type", "code")
            .append_pair("prompt", "consent")
            .append_pair("scope", &SCOPES.join(" "));

        url.into()
    }

    async fn exchange(&self, code: &str) -> Result<ExternalProfile> {
        let tokens = self
            .client
            .post(&self.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| ServerError::upstream("token exchange", err))?
            .json::<TokenResponse>()
            .await
            .map_err(|err| ServerError::upstream("token response", err))?;

        self.client
            .get(&self.userinfo_endpoint)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| ServerError::upstream("profile request", err))?
            .json::<ExternalProfile>()
            .await
            .map_err(|err| ServerError::upstream("profile response", err))
    }
}
