//! Blog HTTP API, mounted under `/api`.
pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod posts;
pub mod status;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::routing::{delete, get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{AppState, ServerError};

/// JSON body checked with [`Validate`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;

        Ok(Valid(value))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(status::handler))
        .nest("/auth", auth::router())
        // `GET /posts` lists, `POST /posts` creates. Authorization required to create.
        .route("/posts", get(posts::list).post(posts::create))
        .route(
            "/post/{id}",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route("/post/{id}/like", post(posts::like))
        .route("/post/{id}/comments", post(comments::create))
        .route("/post/{id}/comments/{comment_id}", delete(comments::delete))
        // `GET /dashboard` goes to `dashboard`. Authorization required.
        .route("/dashboard", get(dashboard::handler))
}

/// State backed by memory, with a seeded `admin` user.
#[cfg(test)]
pub fn state() -> AppState {
    use std::sync::Arc;

    use crate::blog::{BlogService, User};
    use crate::clock::FixedClock;
    use crate::config::Configuration;
    use crate::oauth::{ExternalProfile, OAuthBridge, StaticProvider};
    use crate::store::{Document, Store};
    use crate::token::TokenManager;

    let config = Arc::new(Configuration::default());
    let store = Store::in_memory(Document {
        users: vec![
            User {
                id: "admin".into(),
                google_id: "google-admin".into(),
                name: "Admin".into(),
                email: "admin@example.com".into(),
                picture: None,
            },
            User {
                id: "other".into(),
                google_id: "google-other".into(),
                name: "Other".into(),
                ..Default::default()
            },
        ],
        ..Default::default()
    });
    let provider = Arc::new(StaticProvider::new(ExternalProfile {
        id: "google-new".into(),
        name: "Newcomer".into(),
        email: "new@example.com".into(),
        picture: Some("https://example.com/new.png".into()),
    }));

    AppState {
        token: TokenManager::new(&config.url, "test-secret"),
        blog: BlogService::new(
            store.clone(),
            Arc::new(FixedClock::new(1_700_000_000)),
        ),
        oauth: OAuthBridge::new(provider, store.clone()),
        store,
        config,
        metrics: None,
    }
}
