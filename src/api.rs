//! HTTP client for the mining agent's web API.
//!
//! This module provides:
//!
//! - `AgentClient`: reqwest wrapper bound to one agent base URL
//! - `Credentials`: optional bearer token or basic auth sent with every request
//! - `AgentCommand`: the argument-less control actions (start/stop/reload)
//!
//! The client never touches shared state. Every call returns data (or an
//! `ApiError`) for the caller to apply.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::config::ServerConfig;
use crate::error::{ApiError, ApiResult};
use crate::model::{ActionReply, ChannelRef, Health, Settings, Snapshot};

/// User agent for API requests
const USER_AGENT: &str = concat!("Dropdeck/", env!("CARGO_PKG_VERSION"));

/// Endpoint paths, relative to the agent base URL
pub mod endpoints {
    pub const HEALTH: &str = "api/health";
    pub const SNAPSHOT: &str = "api/snapshot";
    pub const SETTINGS: &str = "api/settings";
    pub const START: &str = "api/actions/start";
    pub const STOP: &str = "api/actions/stop";
    pub const RELOAD: &str = "api/actions/reload";
    pub const SWITCH_CHANNEL: &str = "api/actions/switch-channel";
}

/// Credentials accepted by the agent's auth middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    Basic { user: String, password: String },
}

/// Control actions that take no payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentCommand {
    Start,
    Stop,
    Reload,
}

impl AgentCommand {
    fn path(&self) -> &'static str {
        match self {
            AgentCommand::Start => endpoints::START,
            AgentCommand::Stop => endpoints::STOP,
            AgentCommand::Reload => endpoints::RELOAD,
        }
    }
}

#[derive(Serialize)]
struct SwitchChannelBody<'a> {
    channel: Option<&'a ChannelRef>,
}

/// Agent API client
#[derive(Clone)]
pub struct AgentClient {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl AgentClient {
    /// Create a client for the agent at `base_url`
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            credentials,
        })
    }

    /// Create a client from the `[server]` config section
    pub fn from_config(server: &ServerConfig) -> anyhow::Result<Self> {
        Self::new(
            &server.base_url,
            server.credentials(),
            Duration::from_secs(server.timeout_secs.max(1)),
        )
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the combined settings + runtime snapshot
    pub async fn fetch_snapshot(&self) -> ApiResult<Snapshot> {
        self.send(self.request(Method::GET, endpoints::SNAPSHOT)?)
            .await
    }

    /// Fetch settings directly (older agents without `/api/snapshot`)
    pub async fn fetch_settings(&self) -> ApiResult<Settings> {
        self.send(self.request(Method::GET, endpoints::SETTINGS)?)
            .await
    }

    /// Replace the agent settings, returning what the agent stored
    pub async fn put_settings(&self, settings: &Settings) -> ApiResult<Settings> {
        let builder = self.request(Method::PUT, endpoints::SETTINGS)?.json(settings);
        let saved = self.send(builder).await?;
        tracing::info!("Saved agent settings");
        Ok(saved)
    }

    /// Issue a start/stop/reload action
    pub async fn post_action(&self, command: AgentCommand) -> ApiResult<ActionReply> {
        self.send(self.request(Method::POST, command.path())?).await
    }

    /// Ask the agent to switch channel. `None` lets the agent choose.
    pub async fn switch_channel(&self, channel: Option<&ChannelRef>) -> ApiResult<ActionReply> {
        let builder = self
            .request(Method::POST, endpoints::SWITCH_CHANNEL)?
            .json(&SwitchChannelBody { channel });
        self.send(builder).await
    }

    /// Query the agent health endpoint
    pub async fn health(&self) -> ApiResult<Health> {
        self.send(self.request(Method::GET, endpoints::HEALTH)?).await
    }

    fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Network(format!("invalid request URL: {}", e)))?;

        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(match &self.credentials {
            Some(Credentials::Token(token)) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            Some(Credentials::Basic { user, password }) => builder.basic_auth(user, Some(password)),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let err = classify_failure(status, &body);
            tracing::debug!("Agent request failed: {}", err);
            return Err(err);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Ensure the base URL ends with `/` so relative endpoint paths keep any
/// reverse-proxy prefix.
fn normalize_base_url(raw: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("Invalid agent URL '{}': {}", raw, e))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Turn a non-success response into an `ApiError`.
///
/// Prefers the agent's JSON `error` field (a string, or a list of strings for
/// settings validation), falling back to a generic message with the status.
pub fn classify_failure(status: StatusCode, body: &[u8]) -> ApiError {
    let server_message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").cloned())
        .and_then(|error| match error {
            serde_json::Value::String(message) => Some(message),
            serde_json::Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Some(parts.join("; "))
            }
            _ => None,
        })
        .filter(|message| !message.trim().is_empty());

    let message = match server_message {
        Some(message) => message,
        None if status == StatusCode::UNAUTHORIZED => {
            "unauthorized (check API token or basic auth credentials)".to_string()
        }
        None => format!("request failed with status {}", status.as_u16()),
    };

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
