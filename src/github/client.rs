// GitHub API HTTP client.
// Handles optional authentication, rate limit tracking, and status mapping.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::{FolioError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Upper bound on a whole request, so a stalled server cannot hang the UI.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// GitHub API client with rate limit tracking.
///
/// Shared by reference between concurrent requests, so the rate limit
/// snapshot sits behind a mutex. The token is only sent to URLs under
/// the API base.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    authorization: Option<HeaderValue>,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client for the given API base URL.
    /// Requests are anonymous unless a token is supplied.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self> {
        let authorization = token
            .map(|token| {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| FolioError::Config(format!("invalid token: {}", e)))?;
                value.set_sensitive(true);
                Ok::<_, FolioError>(value)
            })
            .transpose()?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("folio"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(FolioError::Api)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization,
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Whether `url` points at the configured API (and so may carry the token).
    pub fn is_api_url(&self, url: &str) -> bool {
        url.strip_prefix(self.base_url.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
    }

    /// Snapshot of the most recent rate limit headers.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make a GET request to an API path such as `/users/octocat/repos`.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.get_url(&url).await
    }

    /// Make a GET request to an absolute URL (e.g. a `languages_url`).
    pub async fn get_url(&self, url: &str) -> Result<Response> {
        self.send(url, self.client.get(url)).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.send(&url, self.client.get(&url).query(params)).await
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response> {
        let request = match &self.authorization {
            Some(value) if self.is_api_url(url) => request.header(AUTHORIZATION, value.clone()),
            Some(_) => {
                tracing::debug!(url, "not sending token outside the API base");
                request
            }
            None => request,
        };

        let response = request.send().await.map_err(FolioError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response)
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let mut rate_limit = self
            .rate_limit
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(limit) = header_value(response, "x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header_value(response, "x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header_value(response, "x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::FORBIDDEN => {
                let rate_limit = self.rate_limit();
                let reset_at = if rate_limit.reset > 0 {
                    chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
                        .map(|dt| dt.format("%H:%M:%S").to_string())
                } else {
                    None
                };
                Err(FolioError::RateLimited { reset_at })
            }
            StatusCode::NOT_FOUND => Err(FolioError::NotFound(response.url().path().to_string())),
            status => Err(FolioError::Network { status }),
        }
    }
}

/// Parse a numeric header, ignoring values that do not fit `T`.
fn header_value<T: FromStr>(response: &Response, name: &str) -> Option<T> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_api_url() {
        let client = GitHubClient::new("http://127.0.0.1:8080/", Some("secret")).unwrap();

        assert!(client.is_api_url("http://127.0.0.1:8080"));
        assert!(client.is_api_url("http://127.0.0.1:8080/repos/o/r/languages"));
        assert!(client.is_api_url("http://127.0.0.1:8080?page=2"));
        assert!(!client.is_api_url("http://127.0.0.1:80801/repos/o/r/languages"));
        assert!(!client.is_api_url("https://evil.example.com/http://127.0.0.1:8080/"));
    }

    #[test]
    fn test_rejects_invalid_token() {
        let result = GitHubClient::new(GITHUB_API_BASE, Some("bad\ntoken"));
        assert!(matches!(result, Err(FolioError::Config(_))));
    }
}
