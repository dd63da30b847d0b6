//! Identity resolution from the session cookie.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::blog::User;
use crate::{AppState, ServerError};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";
const COOKIE_ATTRIBUTES: &str = "HttpOnly; Secure; SameSite=None";

/// User resolved from the `token` cookie.
///
/// Rejects with [`ServerError::Unauthenticated`] when the cookie is missing,
/// badly signed, expired or names an unknown user.
#[derive(Clone, Debug)]
pub struct Identity(pub User);

impl FromRequestParts<AppState> for Identity {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(ServerError::Unauthenticated)?;

        let claims = state.token.decode(token).map_err(|err| {
            tracing::debug!(%err, "rejected session token");
            ServerError::Unauthenticated
        })?;

        state
            .store
            .read(|document| document.user(&claims.sub).cloned())
            .await?
            .map(Identity)
            .ok_or(ServerError::Unauthenticated)
    }
}

/// Value of the session cookie among every `Cookie` header.
///
/// A value may be wrapped in double quotes, which are not part of it.
fn session_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE)
        .map(|(_, value)| {
            let value = value.trim();
            value
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .unwrap_or(value)
        })
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value opening a session.
pub fn session_cookie(token: &str, max_age: u64) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; Max-Age={max_age}; {COOKIE_ATTRIBUTES}"
    )
}

/// `Set-Cookie` value closing the session.
pub fn expired_cookie() -> String {
    format!(
        "{SESSION_COOKIE}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {COOKIE_ATTRIBUTES}"
    )
}
