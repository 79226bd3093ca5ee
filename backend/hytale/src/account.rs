//! Username lookup through the official accounts site.
//!
//! The availability endpoint only answers logged-in browsers, so this client
//! walks the identity provider's browser login flow and keeps the resulting
//! session cookie for later lookups.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, LOCATION, ORIGIN,
    REFERER, USER_AGENT,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url, redirect};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cookies::CookieJar;
use crate::error::LookupError;
use crate::{Availability, UsernameLookup, UsernameStatus};

const BROWSER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const SESSION_COOKIE: &str = "ory_kratos_session";
const CSRF_PREFIX: &str = "csrf_token";

static FLOW_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"flow=([a-f0-9-]+)").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), password: password.into() }
    }

    pub fn is_complete(&self) -> bool {
        !self.identifier.is_empty() && !self.password.is_empty()
    }
}

/// Hosts taking part in the login flow.
#[derive(Debug, Clone)]
pub struct AccountEndpoints {
    /// Identity provider (login flow).
    pub backend: String,
    /// Account site (login form origin and availability API).
    pub accounts: String,
}

impl Default for AccountEndpoints {
    fn default() -> Self {
        Self {
            backend: "https://backend.accounts.hytale.com".to_string(),
            accounts: "https://accounts.hytale.com".to_string(),
        }
    }
}

pub struct AccountLookup {
    http: Client,
    endpoints: AccountEndpoints,
    credentials: Credentials,
    jar: Mutex<CookieJar>,
}

impl AccountLookup {
    pub fn new(credentials: Credentials, endpoints: AccountEndpoints) -> Result<Self, LookupError> {
        if !credentials.is_complete() {
            warn!("Hytale credentials are incomplete; username checks will fail");
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        // Redirects are walked by hand so every hop's cookies land in the jar.
        let http = Client::builder()
            .default_headers(headers)
            .redirect(redirect::Policy::none())
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            endpoints: AccountEndpoints {
                backend: endpoints.backend.trim_end_matches('/').to_string(),
                accounts: endpoints.accounts.trim_end_matches('/').to_string(),
            },
            credentials,
            jar: Mutex::new(CookieJar::new()),
        })
    }

    fn resolve(&self, base: &str, location: &str) -> Result<Url, LookupError> {
        let base = Url::parse(base).map_err(|e| LookupError::Url(e.to_string()))?;
        base.join(location).map_err(|e| LookupError::Url(e.to_string()))
    }

    fn with_cookies(request: RequestBuilder, jar: &CookieJar) -> RequestBuilder {
        let cookies = jar.header_value();
        if cookies.is_empty() {
            request
        } else {
            request.header(COOKIE, cookies)
        }
    }

    fn absorb_cookies(response: &Response, jar: &mut CookieJar) -> usize {
        jar.absorb(response)
    }

    fn location(response: &Response) -> Option<String> {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    async fn ensure_session(&self, jar: &mut CookieJar) -> Result<(), LookupError> {
        if jar.get(SESSION_COOKIE).is_some() {
            return Ok(());
        }
        info!("No Hytale session held, logging in");
        self.login(jar).await
    }

    async fn login(&self, jar: &mut CookieJar) -> Result<(), LookupError> {
        if !self.credentials.is_complete() {
            return Err(LookupError::MissingCredentials);
        }

        // 1. Start a browser login flow.
        let init_url = format!("{}/self-service/login/browser", self.endpoints.backend);
        let init = self
            .http
            .get(&init_url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;
        if !matches!(init.status(), StatusCode::FOUND | StatusCode::SEE_OTHER) {
            return Err(LookupError::Login(format!(
                "login flow init returned {}",
                init.status().as_u16()
            )));
        }
        Self::absorb_cookies(&init, jar);

        let location = Self::location(&init)
            .ok_or_else(|| LookupError::Login("login flow init had no redirect".into()))?;
        let flow_id = FLOW_ID
            .captures(&location)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| LookupError::Login("could not extract login flow id".into()))?;
        debug!(flow = %flow_id, "Login flow started");

        // 2. Load the login page for the rest of the flow cookies.
        let page_url = self.resolve(&init_url, &location)?;
        let page = Self::with_cookies(self.http.get(page_url), jar).send().await?;
        let stored = Self::absorb_cookies(&page, jar);
        debug!(stored, "Stored login page cookies");

        let (csrf_name, csrf_token) = jar.find_prefixed(CSRF_PREFIX).ok_or_else(|| {
            LookupError::Login(format!("no CSRF cookie among {:?}", jar.names()))
        })?;
        debug!(cookie = %csrf_name, "Found CSRF cookie");

        // 3. Submit credentials.
        let submit_url = format!("{}/self-service/login?flow={flow_id}", self.endpoints.backend);
        let form = [
            ("csrf_token", csrf_token.as_str()),
            ("identifier", self.credentials.identifier.as_str()),
            ("password", self.credentials.password.as_str()),
            ("method", "password"),
        ];
        let submitted = Self::with_cookies(self.http.post(&submit_url), jar)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ORIGIN, self.endpoints.accounts.as_str())
            .header(REFERER, format!("{}/login?flow={flow_id}", self.endpoints.accounts))
            .form(&form)
            .send()
            .await?;
        if !matches!(submitted.status(), StatusCode::FOUND | StatusCode::SEE_OTHER) {
            return Err(LookupError::Login(format!(
                "credential submit returned {}",
                submitted.status().as_u16()
            )));
        }
        Self::absorb_cookies(&submitted, jar);

        let next = Self::location(&submitted)
            .ok_or_else(|| LookupError::Login("credential submit had no redirect".into()))?;
        if next.contains("/error") {
            return Err(LookupError::Login(
                "redirected to the error page; check the configured email and password".into(),
            ));
        }
        if !next.contains("/settings") {
            return Err(LookupError::Login(format!("unexpected redirect to {next}")));
        }

        // 4. Complete the flow.
        let settings_url = self.resolve(&submit_url, &next)?;
        let settings = Self::with_cookies(self.http.get(settings_url), jar)
            .header(REFERER, format!("{}/", self.endpoints.backend))
            .send()
            .await?;
        Self::absorb_cookies(&settings, jar);

        if jar.get(SESSION_COOKIE).is_none() {
            return Err(LookupError::Login("login finished without a session cookie".into()));
        }
        info!("Hytale login succeeded");
        Ok(())
    }
}

#[async_trait]
impl UsernameLookup for AccountLookup {
    async fn check(&self, username: &str) -> Result<UsernameStatus, LookupError> {
        let mut jar = self.jar.lock().await;
        self.ensure_session(&mut jar).await?;

        let url = format!(
            "{}/api/account/username-reservations/availability",
            self.endpoints.accounts
        );
        let response = Self::with_cookies(self.http.get(url), &jar)
            .query(&[("username", username)])
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(REFERER, "https://hytale.com/")
            .send()
            .await?;

        let availability = match response.status() {
            StatusCode::BAD_REQUEST => Availability::Available,
            StatusCode::OK => Availability::Taken,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                jar.remove(SESSION_COOKIE);
                return Err(LookupError::UnexpectedStatus(response.status().as_u16()));
            }
            other => return Err(LookupError::UnexpectedStatus(other.as_u16())),
        };
        Ok(UsernameStatus { availability, cached: false })
    }
}
