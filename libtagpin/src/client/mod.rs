//! Blocking HTTP client shared by the registry clients.
//!
//! This is a thin wrapper over `reqwest::blocking` that applies the configured
//! timeout and user agent, maps HTTP failures onto [`TagpinError`], and parses
//! `Link` pagination headers.

use crate::auth::Credentials;
use crate::error::{Result, TagpinError};
use reqwest::StatusCode;
use reqwest::blocking::{Client as ReqwestClient, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, LINK, RETRY_AFTER};
use serde::de::DeserializeOwned;
use std::time::Duration;


/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libtagpin::client::ClientConfig;
///
/// let config = ClientConfig::new().with_timeout(60);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("tagpin/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the User-Agent header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl From<&crate::config::Network> for ClientConfig {
    fn from(network: &crate::config::Network) -> Self {
        Self::new()
            .with_timeout(network.timeout)
            .with_user_agent(network.user_agent.clone())
    }
}

/// Blocking HTTP client for registry API calls.
#[derive(Debug, Clone)]
pub struct Client {
    http_client: ReqwestClient,
    timeout_seconds: u64,
}

impl Client {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| TagpinError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Sends a GET request and checks the response status.
    ///
    /// `query` pairs are URL-encoded and appended to `url`.
    pub fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        credentials: Option<&Credentials>,
    ) -> Result<Response> {
        let mut request = self.http_client.get(url);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(creds) = credentials
            && let Some(auth_header) = creds.to_header_value()
        {
            request = request.header(AUTHORIZATION, auth_header);
        }

        tracing::debug!(url, "GET");

        let response = request
            .send()
            .map_err(|e| self.translate_reqwest_error(e, url))?;

        Self::check_response_status(response)
    }

    /// Sends a GET request and deserializes the JSON body.
    ///
    /// Returns the `Link` header's next-page target alongside the body.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        credentials: Option<&Credentials>,
    ) -> Result<(T, Option<String>)> {
        let response = self.get(url, query, credentials)?;
        let next = Self::extract_next_link(response.headers());

        let body = response.json::<T>().map_err(|e| {
            TagpinError::validation_with_source(format!("Failed to parse response from {}", url), e)
        })?;

        Ok((body, next))
    }

    /// Extracts the next page target from a `Link` header.
    ///
    /// Registries send `Link: </v2/<name>/tags/list?last=x&n=100>; rel="next"`.
    /// The target is returned as-is and may be relative.
    pub fn extract_next_link(headers: &HeaderMap) -> Option<String> {
        let link_str = headers.get(LINK)?.to_str().ok()?;

        for link_part in link_str.split(',') {
            let link_part = link_part.trim();

            let is_next = link_part.contains("rel=\"next\"")
                || link_part.contains("rel='next'")
                || link_part.contains("rel=next");

            if is_next
                && let Some(start) = link_part.find('<')
                && let Some(end) = link_part.find('>')
                && start < end
            {
                return Some(link_part[start + 1..end].to_string());
            }
        }

        None
    }

    /// Resolves a possibly-relative link target against a base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use libtagpin::client::Client;
    ///
    /// assert_eq!(
    ///     Client::resolve_link("https://ghcr.io", "/v2/a/b/tags/list?last=1"),
    ///     "https://ghcr.io/v2/a/b/tags/list?last=1"
    /// );
    /// ```
    pub fn resolve_link(base_url: &str, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                target.trim_start_matches('/')
            )
        }
    }

    /// Translates a reqwest error into a TagpinError.
    fn translate_reqwest_error(&self, error: reqwest::Error, url: &str) -> TagpinError {
        if error.is_timeout() {
            TagpinError::network_with_source(
                format!(
                    "Request to {} timed out after {} seconds",
                    url, self.timeout_seconds
                ),
                error,
            )
        } else if error.is_connect() {
            TagpinError::network_with_source(format!("Failed to connect to {}", url), error)
        } else if error.is_request() {
            TagpinError::network_with_source(format!("Failed to send request to {}", url), error)
        } else {
            TagpinError::network_with_source(
                format!("Network error communicating with {}", url),
                error,
            )
        }
    }

    /// Parses a `Retry-After` header given in seconds.
    fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
        headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
    }

    /// Checks the HTTP response status and translates errors to TagpinError.
    fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let retry_after = Self::parse_retry_after(response.headers());
        let error_body = response
            .text()
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(TagpinError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(TagpinError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(TagpinError::not_found("endpoint".to_string(), url)),
            StatusCode::TOO_MANY_REQUESTS => Err(TagpinError::rate_limit(
                format!("Rate limit exceeded for {}", url),
                retry_after,
            )),
            StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Err(TagpinError::server(
                format!("Server error from {}: {}", url, error_body),
                status.as_u16(),
            )),
            _ => Err(TagpinError::network(format!(
                "HTTP {} from {}: {}",
                status.as_u16(),
                url,
                error_body
            ))),
        }
    }
}
