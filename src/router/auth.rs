//! Google sign-in and session handling.

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use validator::{ValidationError, ValidationErrors};

use crate::blog::User;
use crate::error::Result;
use crate::middleware::{Identity, expired_cookie, session_cookie};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct Callback {
    code: Option<String>,
}

fn missing_code() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "code",
        ValidationError::new("code")
            .with_message("Missing authorization code".into()),
    );
    errors
}

/// Redirect the browser to the consent screen.
pub async fn google(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, state.oauth.initiate())])
}

/// Open a session for the user behind `code`, then go back to the UI.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<Callback>,
) -> Result<impl IntoResponse> {
    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        return Err(missing_code().into());
    };

    let user = state.oauth.callback(&code).await?;
    let token = state.token.create(&user.id)?;

    Ok((
        StatusCode::FOUND,
        [
            (header::SET_COOKIE, session_cookie(&token, state.token.max_age())),
            (header::LOCATION, state.config.ui_url.clone()),
        ],
    ))
}

pub async fn me(Identity(user): Identity) -> Json<User> {
    Json(user)
}

pub async fn logout() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, expired_cookie())],
        Json(serde_json::json!({ "message": "Logged out successfully" })),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", get(google))
        .route("/google/callback", get(callback))
        .route("/me", get(me))
        .route("/logout", post(logout))
}
