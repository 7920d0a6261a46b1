use std::time::Duration;
use wreq::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
    Client,
};

use crate::error::{Result, TpotmonError};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const API_KEY_HEADER: &str = "x-api-key";

pub struct HttpClient {
    client: Client,
}

/// Raw response body plus the declared content type.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(None, None, None)
    }

    pub fn with_config(
        api_key: Option<&str>,
        bearer_token: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        if let Some(key) = api_key {
            headers.insert(
                HeaderName::from_static(API_KEY_HEADER),
                HeaderValue::from_str(key.trim())
                    // Avoid echoing the key in errors/logs.
                    .map_err(|_| TpotmonError::MissingConfig("Invalid API key".to_string()))?,
            );
        }

        if let Some(token) = bearer_token {
            let clean_token = token
                .strip_prefix("Bearer ")
                .or_else(|| token.strip_prefix("bearer "))
                .unwrap_or(token)
                .trim();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", clean_token))
                    .map_err(|_| TpotmonError::MissingConfig("Invalid bearer token".to_string()))?,
            );
        }

        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }

    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await?;

        self.handle_response(response).await
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await?;

        self.handle_response_text(response).await
    }

    /// GET a binary resource. Non-2xx statuses are errors.
    pub async fn get_bytes(&self, url: &str) -> Result<FetchedBytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.status_to_error(status, &body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await?;

        Ok(FetchedBytes {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    pub async fn post_json<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    pub async fn post_text<B: serde::Serialize>(&self, url: &str, body: &B) -> Result<String> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await?;

        self.handle_response_text(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: wreq::Response,
    ) -> Result<T> {
        let body = self.handle_response_text(response).await?;
        serde_json::from_str(&body).map_err(|e| TpotmonError::InvalidJson(e.to_string()))
    }

    async fn handle_response_text(&self, response: wreq::Response) -> Result<String> {
        let status = response.status();

        let body = response.text().await?;

        if status.is_success() {
            if looks_like_html(&body) {
                return Err(TpotmonError::InvalidJson(
                    "Received HTML instead of JSON".to_string(),
                ));
            }
            Ok(body)
        } else {
            Err(self.status_to_error(status, &body))
        }
    }

    fn status_to_error(&self, status: wreq::StatusCode, body: &str) -> TpotmonError {
        let body = body.trim();

        match status.as_u16() {
            401 | 403 => {
                if body.is_empty() {
                    TpotmonError::Unauthorized(
                        "Authentication required. Check that the API key is set and valid."
                            .to_string(),
                    )
                } else {
                    TpotmonError::Unauthorized(body.to_string())
                }
            }
            429 => TpotmonError::RateLimited(60),
            _ => TpotmonError::NetworkError(format!("HTTP {}: {}", status, body)),
        }
    }
}

fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with("<!DOCTYPE") || head.starts_with("<!doctype") || head.starts_with("<html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let client = HttpClient::with_config(None, None, Some(2)).unwrap();
        match client.get_text("http://127.0.0.1:9/").await {
            Err(TpotmonError::NetworkError(msg)) => assert!(msg.starts_with("Connection failed")),
            Err(TpotmonError::Timeout(_)) => {}
            other => panic!("expected NetworkError, got: {:?}", other),
        }
    }

    #[test]
    fn test_status_to_error_unauthorized_blank_body_is_actionable() {
        let client = HttpClient::new().unwrap();
        match client.status_to_error(wreq::StatusCode::from_u16(401).unwrap(), "") {
            TpotmonError::Unauthorized(msg) => {
                assert!(msg.contains("Authentication required"));
                assert!(msg.contains("API key"));
            }
            other => panic!("expected Unauthorized, got: {:?}", other),
        }
    }

    #[test]
    fn test_status_to_error_unauthorized_non_blank_body_preserved() {
        let client = HttpClient::new().unwrap();
        let body = "invalid api key";
        match client.status_to_error(wreq::StatusCode::from_u16(403).unwrap(), body) {
            TpotmonError::Unauthorized(msg) => assert_eq!(msg, body),
            other => panic!("expected Unauthorized, got: {:?}", other),
        }
    }

    #[test]
    fn test_status_to_error_rate_limited() {
        let client = HttpClient::new().unwrap();
        match client.status_to_error(wreq::StatusCode::from_u16(429).unwrap(), "slow down") {
            TpotmonError::RateLimited(secs) => assert_eq!(secs, 60),
            other => panic!("expected RateLimited, got: {:?}", other),
        }
    }

    #[test]
    fn test_status_to_error_server_error_keeps_status() {
        let client = HttpClient::new().unwrap();
        match client.status_to_error(wreq::StatusCode::from_u16(502).unwrap(), "bad gateway") {
            TpotmonError::NetworkError(msg) => {
                assert!(msg.contains("502"));
                assert!(msg.contains("bad gateway"));
            }
            other => panic!("expected NetworkError, got: {:?}", other),
        }
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("  <!DOCTYPE html><title>x</title>"));
        assert!(looks_like_html("<html></html>"));
        assert!(!looks_like_html("{\"data\": 1}"));
    }

    #[test]
    fn test_invalid_api_key_header_is_config_error() {
        match HttpClient::with_config(Some("bad\nkey"), None, None) {
            Err(TpotmonError::MissingConfig(msg)) => assert!(!msg.contains("bad")),
            Err(other) => panic!("expected MissingConfig, got: {:?}", other),
            Ok(_) => panic!("expected error for key with newline"),
        }
    }
}
