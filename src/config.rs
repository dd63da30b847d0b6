//! Configuration manager for storyline.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_STORE_PATH: &str = "db.json";
const DEFAULT_PORT: u16 = 5000;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Root URI of this server, used to build the OAuth redirect URI.
    pub url: String,
    /// Root URI of the browser application.
    pub ui_url: String,
    /// Listening port.
    pub port: u16,
    #[serde(skip_deserializing)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to the JSON document store.
    #[serde(skip_serializing)]
    pub store: Store,
    /// Related to session JsonWebToken configuration.
    #[serde(skip_serializing)]
    pub token: Token,
    /// Related to Google OAuth2 configuration.
    #[serde(skip_serializing)]
    pub google: Google,
    /// Related to logs, traces and metrics export.
    #[serde(skip_serializing)]
    pub telemetry: Telemetry,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_CRATE_NAME").to_owned(),
            url: format!("http://localhost:{DEFAULT_PORT}"),
            ui_url: "http://localhost:5173".to_owned(),
            port: DEFAULT_PORT,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            store: Store::default(),
            token: Token::default(),
            google: Google::default(),
            telemetry: Telemetry::default(),
        }
    }
}

/// JSON document store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// File holding users, posts and comments.
    pub path: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Json Web Token configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// HMAC secret signing session tokens.
    pub secret: Option<String>,
    /// Session lifetime in days.
    /// Default is 30.
    pub expiration_days: Option<u64>,
}

/// Google OAuth2 client configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Google {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
}

/// Telemetry configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// OTLP collector receiving logs and traces.
    pub otlp_endpoint: Option<String>,
    /// Expose Prometheus metrics on `/metrics`.
    #[serde(default)]
    pub metrics: bool,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.as_str().trim_end_matches('/').to_owned())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location, then applies environment overrides.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        let mut config = match File::open(file_path) {
            Ok(file) => match serde_yaml::from_reader(file) {
                Ok(config) => config,
                Err(err) => self.error(err),
            },
            Err(err) => self.error(err),
        };

        // set app version.
        config.version = VERSION.to_owned();
        config.apply_env(|key| std::env::var(key).ok());

        // normalize URLs.
        config.url = self.normalize_url(&config.url)?;
        config.ui_url = self.normalize_url(&config.ui_url)?;

        Ok(Arc::new(config))
    }

    /// Override file values with environment variables.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(port) = var("PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(url) = var("SERVER_ROOT_URI") {
            self.url = url;
        }
        if let Some(url) = var("UI_ROOT_URI") {
            self.ui_url = url;
        }
        if let Some(path) = var("DB_PATH") {
            self.store.path = path.into();
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.token.secret = Some(secret);
        }
        if let Some(id) = var("GOOGLE_CLIENT_ID") {
            self.google.client_id = id;
        }
        if let Some(secret) = var("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = secret;
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found");
        Self::default()
    }
}
