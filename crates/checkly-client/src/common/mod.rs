//! Common utilities for the Checkly API client
//!
//! Authenticated request helpers and status-code mapping shared by all endpoints.

use crate::error::ChecklyError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// HTTP client wrapper with Checkly authentication
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_key: String,
    account_id: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, api_key: String, account_id: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            account_id,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("X-Checkly-Account", &self.account_id)
            .header("Accept", "application/json")
    }

    /// Map a non-success response to an error
    async fn check(method: &str, path: &str, response: Response) -> Result<Response, ChecklyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => {
                ChecklyError::NotFound(format!("Resource not found: {} - {}", path, body))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChecklyError::Authentication(
                format!("{} {} rejected: {} - {}", method, path, status, body),
            ),
            _ => ChecklyError::Api(format!("{} {} failed: {} - {}", method, path, status, body)),
        })
    }

    /// Decode a JSON body, keeping a snippet of the payload on failure
    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ChecklyError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ChecklyError::Api(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Make a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ChecklyError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::decode(Self::check("GET", path, response).await?).await
    }

    /// Make a POST request
    pub async fn post<B: Serialize + ?Sized, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ChecklyError> {
        let url = self.build_url(path);
        debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        Self::decode(Self::check("POST", path, response).await?).await
    }

    /// Make a PUT request
    pub async fn put<B: Serialize + ?Sized, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ChecklyError> {
        let url = self.build_url(path);
        debug!("PUT {}", url);

        let response = self
            .authorize(self.client.put(&url))
            .json(body)
            .send()
            .await?;
        Self::decode(Self::check("PUT", path, response).await?).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), ChecklyError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.authorize(self.client.delete(&url)).send().await?;
        Self::check("DELETE", path, response).await?;
        Ok(())
    }
}
