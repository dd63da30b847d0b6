//! Storyline is a small blogging service: Google sign-in, posts, comments
//! and likes kept in a single JSON document.
#![forbid(unsafe_code)]

pub mod blog;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
mod middleware;
pub mod oauth;
mod router;
pub mod store;
pub mod telemetry;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
use error::ServerError;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    state: Option<&AppState>,
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(state) = state {
        let token = state.token.create("admin").expect("cannot create JWT");
        request = request.header(header::COOKIE, format!("token={token}"));
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub store: store::Store,
    pub blog: blog::BlogService,
    pub oauth: oauth::OAuthBridge,
    pub token: token::TokenManager,
    pub metrics: Option<PrometheusHandle>,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let origin = HeaderValue::from_str(&state.config.ui_url)
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173"));

    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE, header::SET_COOKIE]))
        // Only the UI may call with its cookies.
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        );

    Router::new()
        .nest("/api", router::router())
        // `GET /metrics` goes to `exporter`.
        .route("/metrics", get(telemetry::exporter))
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<config::Configuration>,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let Some(secret) = config.token.secret.as_deref() else {
        tracing::error!("missing `token.secret` entry or `JWT_SECRET` variable");
        return Err("missing session token secret".into());
    };
    let token = token::TokenManager::new(&config.url, secret).expiration_days(
        config
            .token
            .expiration_days
            .unwrap_or(token::DEFAULT_EXPIRATION_DAYS),
    );

    let store =
        store::Store::open(store::JsonFileBackend::new(&config.store.path))
            .await?;
    tracing::info!(path = %config.store.path.display(), "document store opened");

    let blog = blog::BlogService::new(store.clone(), Arc::new(clock::SystemClock));
    let oauth = oauth::OAuthBridge::new(
        Arc::new(oauth::GoogleProvider::new(&config.google, &config.url)),
        store.clone(),
    );

    Ok(AppState {
        config,
        store,
        blog,
        oauth,
        token,
        metrics,
    })
}
