//! Error handler for storyline.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, ServerError>;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("not authorized")]
    Unauthenticated,

    #[error("not the owner of this resource")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("authentication with provider failed, {details}")]
    UpstreamAuth {
        details: String,
        source: Option<Source>,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Source>,
    },
}

impl ServerError {
    /// Build an [`ServerError::UpstreamAuth`] from any error.
    pub fn upstream<E>(details: &str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::UpstreamAuth {
            details: details.to_owned(),
            source: Some(Box::new(err)),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    #[serde(skip)]
    status: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `message` field.
    pub fn message(mut self, message: &str) -> Self {
        self.message = message.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        let errors = parse_validation_errors(errors);
        if let Some(first) = errors.first() {
            self.message = first.message.clone();
        }
        self.errors = Some(errors);
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(
        self,
    ) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            message: "Server Error".to_owned(),
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| issue.code.to_string()),
            })
        })
        .collect::<Vec<_>>();
    // field_errors() is backed by a map without stable order.
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .message(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => {
                response.errors(validation_errors)
            },

            ServerError::Axum(rejection) => {
                response.message(&rejection.body_text())
            },

            ServerError::Unauthenticated => response
                .message("Not authorized")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::Forbidden => response
                .message("Not authorized to modify this resource")
                .status(StatusCode::FORBIDDEN),

            ServerError::NotFound(_) => response.status(StatusCode::NOT_FOUND),

            ServerError::UpstreamAuth { details, source } => {
                tracing::error!(err = ?source, %details, "oauth exchange failed");

                ResponseError::default().message("Authentication failed")
            },

            ServerError::StoreUnavailable(err) => {
                tracing::error!(%err, "document store unavailable");

                ResponseError::default()
            },

            ServerError::Token(err) => {
                tracing::error!(%err, "cannot sign session token");

                ResponseError::default()
            },

            ServerError::Internal { details, source } => {
                tracing::error!(err = ?source, %details, "server returned 500 status");

                ResponseError::default()
            },
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({ "message": "Server Error" })
                .to_string()
                .into(),
        )
        .unwrap_or_else(|_| Response::new("Server Error".into()))
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use validator::ValidationError;

    use super::*;

    async fn render(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_taxonomy_status_codes() {
        assert_eq!(
            render(ServerError::Unauthenticated).await.0,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(render(ServerError::Forbidden).await.0, StatusCode::FORBIDDEN);

        let (status, body) = render(ServerError::NotFound("Post")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "message": "Post not found" }));
    }

    #[tokio::test]
    async fn test_server_failures_hide_details() {
        let err = ServerError::StoreUnavailable(StoreError::Io(
            std::io::Error::other("disk on fire"),
        ));
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "message": "Server Error" }));
    }

    #[tokio::test]
    async fn test_validation_message_comes_from_field() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "text",
            ValidationError::new("blank")
                .with_message("Comment text cannot be empty".into()),
        );

        let (status, body) = render(errors.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Comment text cannot be empty");
        assert_eq!(body["errors"][0]["field"], "text");
    }
}
