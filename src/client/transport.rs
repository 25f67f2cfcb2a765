//! Transport abstraction
//!
//! The facade talks to the service only through [`Transport`], so tests can
//! script responses without a network. [`HttpTransport`] is the production
//! implementation on top of a blocking reqwest client.

use crate::client::config::ClientConfig;
use crate::client::request::{Method, Request};
use crate::client::{ClientError, ClientResult};
use crate::credentials::Credentials;
use reqwest::blocking::Client;
use tracing::debug;

/// Status, headers and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in arrival order
    pub headers: Vec<(String, String)>,
    /// Response body text
    pub body: String,
}

impl RawResponse {
    /// Response with no headers
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request and returns the raw response
///
/// Implementations return `Err` only when no HTTP response was obtained
/// (connection failure, timeout, bad URL). Non-2xx statuses are `Ok`.
pub trait Transport: Send + Sync {
    /// Execute `request` synchronously
    ///
    /// # Errors
    /// Returns `ClientError::Network` or `ClientError::InvalidUrl` when the
    /// request could not be completed
    fn execute(&self, request: &Request) -> ClientResult<RawResponse>;
}

/// Blocking HTTP transport with basic authentication
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpTransport {
    /// Create a transport for the configured host
    ///
    /// # Errors
    /// Returns `ClientError::Network` if the HTTP client cannot be built
    /// (e.g. TLS backend initialisation failure)
    pub fn new(config: &ClientConfig, credentials: Credentials) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            credentials,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &Request) -> ClientResult<RawResponse> {
        let url = request.url(&self.base_url)?;
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        debug!("{} {} with {} params", request.method(), url, request.params().len());

        let mut builder = self
            .client
            .request(method, url)
            .basic_auth(self.credentials.key(), Some(self.credentials.secret()))
            .timeout(request.timeout())
            .query(request.params());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .map_err(|e| ClientError::Network(format!("Failed to read response body: {e}")))?;

        debug!("Response {} ({} bytes)", status, body.len());

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
