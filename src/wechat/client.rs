//! HTTP plumbing shared by the token and message calls.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{body_excerpt, transport_detail, Error, Result};

pub const STABLE_TOKEN_PATH: &str = "/cgi-bin/stable_token";
pub const TEMPLATE_SEND_PATH: &str = "/cgi-bin/message/template/send";

/// Client for the WeChat Official Account API.
///
/// Each request is bounded by the configured timeout. The underlying
/// connection pool is released when the client is dropped.
#[derive(Debug, Clone)]
pub struct WechatClient {
    http: Client,
    base_url: String,
}

impl WechatClient {
    /// Create client from resolved configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Create client against a custom API base (primarily for tests).
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Result<Self> {
        let config = Config {
            api_base: base_url.into(),
            ..Config::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serialize `body` to JSON and POST it. See [`WechatClient::post_body`].
    pub(crate) async fn post_json<B: Serialize>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<String> {
        let body = serde_json::to_string(body)?;
        self.post_body(path, query, body).await
    }

    /// POST an already serialized JSON body and return the raw response text.
    ///
    /// Connection failures, timeouts, unreadable bodies and non-2xx statuses
    /// all surface as [`Error::Transport`].
    pub(crate) async fn post_body(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: String,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(endpoint = %url, "POST");

        let response = self
            .http
            .post(&url)
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                Error::Transport(format!("POST {} failed: {}", path, transport_detail(e)))
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            Error::Transport(format!(
                "Failed to read response from {}: {}",
                path,
                transport_detail(e)
            ))
        })?;

        if !status.is_success() {
            return Err(Error::Transport(format!(
                "{} returned HTTP {}: {}",
                path,
                status.as_u16(),
                body_excerpt(&text)
            )));
        }

        Ok(text)
    }
}
