use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::LookupError;
use crate::{Availability, UsernameLookup, UsernameStatus};

pub const DEFAULT_CHECKER_URL: &str = "https://api.hytl.tools";

#[derive(Debug, Deserialize)]
struct CheckResponse {
    status: String,
    #[serde(default)]
    cached: bool,
}

/// Lookup against the public username checker service.
pub struct PublicLookup {
    http: Client,
    base_url: Url,
}

impl PublicLookup {
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        let base_url = Url::parse(base_url).map_err(|e| LookupError::Url(e.to_string()))?;
        let http = Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self { http, base_url })
    }

    fn check_url(&self, username: &str) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .push("check")
            .push(username);
        Ok(url)
    }
}

#[async_trait]
impl UsernameLookup for PublicLookup {
    async fn check(&self, username: &str) -> Result<UsernameStatus, LookupError> {
        let url = self.check_url(username)?;
        debug!(%url, "Checking Hytale username");

        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(LookupError::UnexpectedStatus(response.status().as_u16()));
        }
        let body: CheckResponse = response.json().await?;

        Ok(UsernameStatus {
            availability: Availability::from_status(&body.status),
            cached: body.cached,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn username_is_path_encoded() {
        let lookup = PublicLookup::new("https://api.hytl.tools/").unwrap();
        let url = lookup.check_url("a b/c").unwrap();
        assert_eq!(url.as_str(), "https://api.hytl.tools/check/a%20b%2Fc");
    }

    #[tokio::test]
    async fn parses_status_and_cache_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/check/Notch"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "taken", "cached": true })),
            )
            .mount(&server)
            .await;

        let status = PublicLookup::new(&server.uri()).unwrap().check("Notch").await.unwrap();
        assert_eq!(status.availability, Availability::Taken);
        assert!(status.cached);
    }

    #[tokio::test]
    async fn unrecognised_status_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/check/odd"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "pending" })),
            )
            .mount(&server)
            .await;

        let status = PublicLookup::new(&server.uri()).unwrap().check("odd").await.unwrap();
        assert_eq!(status.availability, Availability::Unknown("pending".into()));
        assert!(!status.cached);
    }

    #[tokio::test]
    async fn server_errors_surface_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = PublicLookup::new(&server.uri()).unwrap().check("x").await.unwrap_err();
        assert!(matches!(err, LookupError::UnexpectedStatus(500)));
    }
}
