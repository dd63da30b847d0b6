//! Comments HTTP API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::blog::{CommentInput, CommentView};
use crate::error::Result;
use crate::middleware::Identity;
use crate::router::Valid;
use crate::AppState;

pub async fn create(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Identity(user): Identity,
    Valid(body): Valid<CommentInput>,
) -> Result<(StatusCode, Json<CommentView>)> {
    let comment = state.blog.add_comment(&post_id, body, &user.id).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Comments are looked up by their own ID, the post segment is not checked.
pub async fn delete(
    State(state): State<AppState>,
    Path((_post_id, comment_id)): Path<(String, String)>,
    Identity(user): Identity,
) -> Result<Json<Value>> {
    state.blog.delete_comment(&comment_id, &user.id).await?;

    Ok(Json(json!({ "message": "Comment removed" })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::router::posts::tests::{body, create_post};
    use crate::*;

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let state = router::state();
        let app = app(state.clone());
        let id = create_post(&state, app.clone()).await;

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::POST,
            &format!("/api/post/{id}/comments"),
            json!({ "text": "hi" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let comment = body(response).await;
        assert_eq!(comment["author"]["name"], "Admin");
        let comment_id = comment["_id"].as_str().unwrap().to_owned();

        let response = make_request(
            None,
            app.clone(),
            Method::GET,
            &format!("/api/post/{id}"),
            String::default(),
        )
        .await;
        let detail = body(response).await;
        assert_eq!(detail["commentCount"], 1);
        assert_eq!(detail["comments"][0]["text"], "hi");

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::DELETE,
            &format!("/api/post/{id}/comments/{comment_id}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["message"], "Comment removed");

        let response = make_request(
            Some(&state),
            app,
            Method::DELETE,
            &format!("/api/post/{id}/comments/{comment_id}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(response).await["message"], "Comment not found");
    }

    #[tokio::test]
    async fn test_empty_comment_is_rejected() {
        let state = router::state();
        let app = app(state.clone());
        let id = create_post(&state, app.clone()).await;

        let response = make_request(
            Some(&state),
            app,
            Method::POST,
            &format!("/api/post/{id}/comments"),
            json!({ "text": "   " }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await["message"], "Comment text cannot be empty");
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let state = router::state();
        let app = app(state.clone());

        let response = make_request(
            Some(&state),
            app,
            Method::POST,
            "/api/post/unknown/comments",
            json!({ "text": "hi" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
