use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::FrontApiError;
use crate::types::{Envelope, Fronters, Health, Member, SwitchResult, TokenRotation};

/// Operations the bot performs against the front-management backend.
#[async_trait]
pub trait FrontApi: Send + Sync {
    async fn health(&self) -> Result<Health, FrontApiError>;

    /// Full member directory.
    async fn members(&self) -> Result<Vec<Member>, FrontApiError>;

    /// Currently-active members.
    async fn fronters(&self) -> Result<Fronters, FrontApiError>;

    /// Replace the complete active set with `member_ids`.
    async fn switch(&self, member_ids: &[String]) -> Result<SwitchResult, FrontApiError>;

    /// Rotate the bot's own API token; the current one stops working.
    async fn regenerate_token(&self) -> Result<TokenRotation, FrontApiError>;
}

#[derive(Debug, Clone)]
pub struct FrontClientConfig {
    pub base_url: String,
    pub token: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for FrontClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://doughmination.win".to_string(),
            token: String::new(),
            user_agent: "CloveShortcuts/1.0.0".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for the front-management API.
pub struct FrontClient {
    http: Client,
    base_url: String,
}

impl FrontClient {
    pub fn new(config: FrontClientConfig) -> Result<Self> {
        if config.token.is_empty() {
            warn!("Front API token is empty; authenticated calls will be rejected");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.token))
                .context("Front API token is not a valid header value")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to build front API HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, action: &'static str) -> Result<T, FrontApiError> {
        debug!(path, "GET front API");
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| FrontApiError::new(action, e.to_string()))?;
        read_json(response, action).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        action: &'static str,
    ) -> Result<T, FrontApiError> {
        debug!(path, "POST front API");
        let mut request = self.http.post(self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| FrontApiError::new(action, e.to_string()))?;
        read_json(response, action).await
    }
}

/// Decode a 2xx body, or turn a non-2xx into an error carrying the server's detail.
async fn read_json<T: DeserializeOwned>(response: Response, action: &'static str) -> Result<T, FrontApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body).unwrap_or_else(|| {
            format!("Request failed with status code {}", status.as_u16())
        });
        return Err(FrontApiError::new(action, detail).with_status(status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| FrontApiError::new(action, format!("invalid response body: {e}")).with_status(status.as_u16()))
}

/// The `detail` field of an error body, stringified when it is not a string.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl FrontApi for FrontClient {
    async fn health(&self) -> Result<Health, FrontApiError> {
        self.get("/api/bot/health", "Health check failed").await
    }

    async fn members(&self) -> Result<Vec<Member>, FrontApiError> {
        let envelope: Envelope<Vec<Member>> =
            self.get("/api/bot/members", "Failed to get members").await?;
        Ok(envelope.data)
    }

    async fn fronters(&self) -> Result<Fronters, FrontApiError> {
        let envelope: Envelope<Option<Fronters>> =
            self.get("/api/bot/fronters", "Failed to get fronters").await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn switch(&self, member_ids: &[String]) -> Result<SwitchResult, FrontApiError> {
        let body = json!({ "member_ids": member_ids });
        self.post("/api/bot/switch", Some(&body), "Failed to switch fronters").await
    }

    async fn regenerate_token(&self) -> Result<TokenRotation, FrontApiError> {
        self.post::<_, Value>("/api/bot/token/regenerate-self", None, "Failed to regenerate token")
            .await
    }
}
