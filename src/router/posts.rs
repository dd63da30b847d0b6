//! Posts HTTP API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::blog::{Post, PostDetail, PostInput, PostView};
use crate::error::Result;
use crate::middleware::Identity;
use crate::router::Valid;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<PostView>>> {
    Ok(Json(state.blog.list().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostDetail>> {
    Ok(Json(state.blog.get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Identity(user): Identity,
    Valid(body): Valid<PostInput>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = state.blog.create(body, &user.id).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Identity(user): Identity,
    Valid(body): Valid<PostInput>,
) -> Result<Json<Post>> {
    Ok(Json(state.blog.update(&id, body, &user.id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Identity(user): Identity,
) -> Result<Json<Value>> {
    state.blog.delete(&id, &user.id).await?;

    Ok(Json(json!({ "message": "Post removed" })))
}

/// Toggle the like of the signed-in user.
pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Identity(user): Identity,
) -> Result<Json<Post>> {
    Ok(Json(state.blog.toggle_like(&id, &user.id).await?))
}

#[cfg(test)]
pub(super) mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;

    use crate::*;

    pub async fn body(response: axum::http::Response<axum::body::Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    pub async fn create_post(state: &AppState, app: Router) -> String {
        let response = make_request(
            Some(state),
            app,
            Method::POST,
            "/api/posts",
            json!({ "title": "A", "content": "B" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        body(response).await["_id"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let state = router::state();
        let app = app(state.clone());

        let id = create_post(&state, app.clone()).await;

        let response = make_request(
            None,
            app,
            Method::GET,
            "/api/posts",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let posts = body(response).await;
        assert_eq!(posts[0]["_id"], id.as_str());
        assert_eq!(posts[0]["commentCount"], 0);
        assert_eq!(posts[0]["author"]["name"], "Admin");
    }

    #[tokio::test]
    async fn test_create_requires_session_and_fields() {
        let state = router::state();
        let app = app(state.clone());

        let response = make_request(
            None,
            app.clone(),
            Method::POST,
            "/api/posts",
            json!({ "title": "A", "content": "B" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = make_request(
            Some(&state),
            app,
            Method::POST,
            "/api/posts",
            json!({ "title": "A" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body(response).await["message"],
            "Please provide title and content"
        );
    }

    #[tokio::test]
    async fn test_get_unknown_post() {
        let app = app(router::state());

        let response = make_request(
            None,
            app,
            Method::GET,
            "/api/post/unknown",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(response).await["message"], "Post not found");
    }

    #[tokio::test]
    async fn test_update_then_delete() {
        let state = router::state();
        let app = app(state.clone());
        let id = create_post(&state, app.clone()).await;

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::PUT,
            &format!("/api/post/{id}"),
            json!({ "title": "New", "content": "Text" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["title"], "New");

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::DELETE,
            &format!("/api/post/{id}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["message"], "Post removed");

        let response = make_request(
            None,
            app,
            Method::GET,
            &format!("/api/post/{id}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let state = router::state();
        let app = app(state.clone());

        let post = state
            .blog
            .create(blog::PostInput::new("Theirs", "Text"), "other")
            .await
            .unwrap();

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::PUT,
            &format!("/api/post/{}", post.id),
            json!({ "title": "Mine", "content": "Text" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = make_request(
            Some(&state),
            app,
            Method::DELETE,
            &format!("/api/post/{}", post.id),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(state.blog.get(&post.id).await.unwrap().post.title, "Theirs");
    }

    #[tokio::test]
    async fn test_like_toggles() {
        let state = router::state();
        let app = app(state.clone());
        let id = create_post(&state, app.clone()).await;
        let path = format!("/api/post/{id}/like");

        let response =
            make_request(Some(&state), app.clone(), Method::POST, &path, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["likes"], json!(["admin"]));

        let response =
            make_request(Some(&state), app, Method::POST, &path, String::default())
                .await;
        assert_eq!(body(response).await["likes"], json!([]));
    }
}
