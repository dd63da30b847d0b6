//! Activity of the signed-in user.

use axum::Json;
use axum::extract::State;

use crate::blog::Dashboard;
use crate::error::Result;
use crate::middleware::Identity;
use crate::AppState;

pub async fn handler(
    State(state): State<AppState>,
    Identity(user): Identity,
) -> Result<Json<Dashboard>> {
    Ok(Json(state.blog.dashboard(&user.id).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::router::posts::tests::{body, create_post};
    use crate::*;

    #[tokio::test]
    async fn test_dashboard_handler() {
        let state = router::state();
        let app = app(state.clone());
        let id = create_post(&state, app.clone()).await;
        state
            .blog
            .create(blog::PostInput::new("Theirs", "Text"), "other")
            .await
            .unwrap();

        let response = make_request(
            Some(&state),
            app.clone(),
            Method::GET,
            "/api/dashboard",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let dashboard = body(response).await;
        assert_eq!(dashboard["userPosts"].as_array().unwrap().len(), 1);
        assert_eq!(dashboard["userPosts"][0]["_id"], id.as_str());
        assert!(dashboard["likedPosts"].as_array().unwrap().is_empty());
        assert!(dashboard["userComments"].as_array().unwrap().is_empty());

        let response = make_request(
            None,
            app,
            Method::GET,
            "/api/dashboard",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
