//! Typed HTTP client for the blog API.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{Client, Method, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::blog::{
    CommentView, Dashboard, Post, PostDetail, PostInput, PostView, User,
};

const FETCH_FAILED: &str = "Failed to fetch";

/// Any failed call, whatever went wrong.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RequestFailed {
    /// `None` when no response was received.
    pub status: Option<StatusCode>,
    pub message: String,
}

impl RequestFailed {
    fn transport(err: reqwest::Error) -> Self {
        tracing::warn!(%err, "api call failed");

        Self {
            status: None,
            message: FETCH_FAILED.to_owned(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RequestFailed>;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client sending cookies along with every call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new [`ApiClient`] keeping its own cookies.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_cookie_jar(base_url, Arc::new(Jar::default()))
    }

    /// Create a new [`ApiClient`] reading and storing cookies in `jar`.
    pub fn with_cookie_jar(base_url: &str, jar: Arc<Jar>) -> Result<Self> {
        let http = Client::builder()
            .cookie_provider(jar)
            .build()
            .map_err(RequestFailed::transport)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Call `/api{endpoint}`.
    ///
    /// Without explicit `method`, a call carrying a body is a `POST` and
    /// one without is a `GET`. Returns `None` when the response is not JSON.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Option<Method>,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Option<T>> {
        let method = method.unwrap_or(match body {
            Some(_) => Method::POST,
            None => Method::GET,
        });

        let mut request = self
            .http
            .request(method, format!("{}/api{endpoint}", self.base_url))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(RequestFailed::transport)?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        if !is_json {
            return Ok(None);
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(RequestFailed::transport)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Option<Method>,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<T> {
        self.send(method, endpoint, body)
            .await?
            .ok_or_else(|| RequestFailed {
                status: None,
                message: "Empty response".to_owned(),
            })
    }

    /// Where to send the browser to sign in.
    pub fn login_url(&self) -> String {
        format!("{}/api/auth/google", self.base_url)
    }

    /// Signed-in user, or `None` without a valid session.
    pub async fn current_user(&self) -> Result<Option<User>> {
        match self.send(None, "/auth/me", None).await {
            Err(RequestFailed {
                status: Some(StatusCode::UNAUTHORIZED),
                ..
            }) => Ok(None),
            result => result,
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.send::<Value>(Some(Method::POST), "/auth/logout", None)
            .await
            .map(drop)
    }

    pub async fn posts(&self) -> Result<Vec<PostView>> {
        self.fetch(None, "/posts", None).await
    }

    pub async fn post(&self, id: &str) -> Result<PostDetail> {
        self.fetch(None, &format!("/post/{id}"), None).await
    }

    pub async fn create_post(&self, input: &PostInput) -> Result<Post> {
        self.fetch(None, "/posts", Some(to_value(input)?)).await
    }

    pub async fn update_post(&self, id: &str, input: &PostInput) -> Result<Post> {
        self.fetch(Some(Method::PUT), &format!("/post/{id}"), Some(to_value(input)?))
            .await
    }

    pub async fn delete_post(&self, id: &str) -> Result<()> {
        self.send::<Value>(Some(Method::DELETE), &format!("/post/{id}"), None)
            .await
            .map(drop)
    }

    pub async fn toggle_like(&self, id: &str) -> Result<Post> {
        self.fetch(Some(Method::POST), &format!("/post/{id}/like"), None)
            .await
    }

    pub async fn add_comment(&self, post_id: &str, text: &str) -> Result<CommentView> {
        self.fetch(
            None,
            &format!("/post/{post_id}/comments"),
            Some(json!({ "text": text })),
        )
        .await
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<()> {
        self.send::<Value>(
            Some(Method::DELETE),
            &format!("/post/{post_id}/comments/{comment_id}"),
            None,
        )
        .await
        .map(drop)
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        self.fetch(None, "/dashboard", None).await
    }
}

fn to_value(input: &impl Serialize) -> Result<Value> {
    serde_json::to_value(input).map_err(|err| RequestFailed {
        status: None,
        message: err.to_string(),
    })
}

/// Turn a non-success response into [`RequestFailed`].
async fn failure(response: Response) -> RequestFailed {
    let status = response.status();
    let fallback = format!(
        "Network response was not ok: {}",
        status.canonical_reason().unwrap_or_default()
    );

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
        .unwrap_or(fallback);

    RequestFailed {
        status: Some(status),
        message,
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Url;

    use super::*;
    use crate::AppState;

    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, crate::app(state)).await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn signed_in(state: &AppState, base_url: &str) -> ApiClient {
        let jar = Arc::new(Jar::default());
        let token = state.token.create("admin").unwrap();
        jar.add_cookie_str(&format!("token={token}"), &Url::parse(base_url).unwrap());

        ApiClient::with_cookie_jar(base_url, jar).unwrap()
    }

    #[tokio::test]
    async fn test_post_and_comment_end_to_end() {
        let state = crate::router::state();
        let base_url = serve(state.clone()).await;
        let api = signed_in(&state, &base_url).await;

        let user = api.current_user().await.unwrap().unwrap();
        assert_eq!(user.id, "admin");

        let post = api.create_post(&PostInput::new("A", "B")).await.unwrap();
        assert_eq!(post.author, "admin");

        let posts = api.posts().await.unwrap();
        let listed = posts.iter().find(|p| p.id == post.id).unwrap();
        assert_eq!(listed.comment_count, 0);

        let comment = api.add_comment(&post.id, "hi").await.unwrap();
        assert_eq!(comment.author.unwrap().name, "Admin");

        let detail = api.post(&post.id).await.unwrap();
        assert_eq!(detail.post.comment_count, 1);
        assert_eq!(detail.comments[0].text, "hi");

        let liked = api.toggle_like(&post.id).await.unwrap();
        assert!(liked.is_liked_by("admin"));
        let dashboard = api.dashboard().await.unwrap();
        assert_eq!(dashboard.liked_posts.len(), 1);
        assert_eq!(dashboard.user_comments.len(), 1);

        api.delete_comment(&post.id, &comment.id).await.unwrap();
        api.delete_post(&post.id).await.unwrap();
        assert!(api.posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failures_carry_server_message() {
        let state = crate::router::state();
        let base_url = serve(state.clone()).await;
        let api = signed_in(&state, &base_url).await;

        let err = api.create_post(&PostInput::new("", "B")).await.unwrap_err();
        assert_eq!(err.status, Some(StatusCode::BAD_REQUEST));
        assert_eq!(err.message, "Please provide title and content");

        let err = api.post("missing").await.unwrap_err();
        assert_eq!(err.status, Some(StatusCode::NOT_FOUND));
        assert_eq!(err.to_string(), "Post not found");
    }

    #[tokio::test]
    async fn test_anonymous_session_check() {
        let state = crate::router::state();
        let base_url = serve(state).await;
        let api = ApiClient::new(&base_url).unwrap();

        assert!(api.current_user().await.unwrap().is_none());
        assert_eq!(api.login_url(), format!("{base_url}/api/auth/google"));

        let err = api.dashboard().await.unwrap_err();
        assert_eq!(err.status, Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.message, "Not authorized");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();

        let err = api.posts().await.unwrap_err();
        assert_eq!(err.status, None);
        assert_eq!(err.message, FETCH_FAILED);
    }
}
