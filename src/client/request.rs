//! Request construction
//!
//! A [`Request`] is a resource template such as `/{version}/series/key/{key}/`
//! plus the segment values, query parameters, headers and JSON body needed to
//! send it. Placeholders are expanded only when the URL is resolved, so an
//! unfilled placeholder is reported by the transport as an invalid URL.

use crate::client::config::{DEFAULT_TIMEOUT_MS, USER_AGENT};
use crate::client::{ClientError, ClientResult};
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// HTTP verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        write!(f, "{s}")
    }
}

/// An outgoing API request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    resource: String,
    segments: Vec<(String, String)>,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<String>,
    timeout: Duration,
}

impl Request {
    /// Build a request with the standard client headers and timeout
    ///
    /// # Arguments
    /// * `method` - HTTP verb
    /// * `resource` - Path template (`/{version}/series/`) or a full URL
    pub fn build(method: Method, resource: impl Into<String>) -> Self {
        let mut request = Self {
            method,
            resource: resource.into(),
            segments: Vec::new(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };
        request.add_header("Accept", "application/json");
        request.add_header("Accept-Encoding", "gzip,deflate");
        request.add_header("User-Agent", USER_AGENT);
        request
    }

    /// Serialize `body` as the JSON payload
    ///
    /// # Errors
    /// Returns `ClientError::Serialize` if the value cannot be encoded
    pub fn with_json_body<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        let json = serde_json::to_string(body)
            .map_err(|e| ClientError::Serialize(format!("Failed to encode request body: {e}")))?;
        self.add_header("Content-Type", "application/json");
        self.body = Some(json);
        Ok(self)
    }

    /// Supply the value for a `{name}` placeholder
    pub fn add_url_segment(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.segments.push((name.into(), value.into()));
    }

    /// Append a query parameter (repeated names are kept)
    pub fn add_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// Set a header, replacing any existing value with the same name
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// HTTP verb
    pub fn method(&self) -> Method {
        self.method
    }

    /// Unexpanded resource template
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Query parameters in insertion order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value of a query parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a repeated query parameter
    pub fn params_named(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Headers
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// JSON payload, if any
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Path and query this request resolves to, or the raw resource if it
    /// cannot be resolved
    pub fn path(&self) -> String {
        Url::parse("http://localhost/")
            .ok()
            .and_then(|base| self.resolve(&base).ok())
            .map(|url| match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            })
            .unwrap_or_else(|| self.resource.clone())
    }

    /// Absolute URL for this request
    ///
    /// Templates are expanded onto `base_url` with each segment value
    /// percent-encoded. Continuation links are joined to `base_url` and must
    /// stay on its origin, since the transport attaches credentials.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidUrl` if a placeholder was never filled, a
    /// link does not parse or a link points at another origin
    pub fn url(&self, base_url: &str) -> ClientResult<Url> {
        let base = Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        let url = self.resolve(&base)?;
        if url.origin() != base.origin() {
            return Err(ClientError::InvalidUrl(format!(
                "{url} is not on {}",
                base.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }

    fn resolve(&self, base: &Url) -> ClientResult<Url> {
        if !self.resource.contains('{') {
            return base
                .join(&self.resource)
                .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.resource)));
        }

        let mut values = Vec::new();
        for piece in self.resource.trim_start_matches('/').split('/') {
            let value = match placeholder(piece) {
                Some(name) => self
                    .segments
                    .iter()
                    .find(|(segment, _)| segment == name)
                    .map(|(_, value)| value.as_str())
                    .ok_or_else(|| {
                        ClientError::InvalidUrl(format!(
                            "unfilled placeholder {piece} in {}",
                            self.resource
                        ))
                    })?,
                None => piece,
            };
            values.push(value);
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{base} cannot be a base")))?
            .pop_if_empty()
            .extend(values);
        Ok(url)
    }
}

/// Name inside a `{name}` path piece
fn placeholder(piece: &str) -> Option<&str> {
    piece.strip_prefix('{').and_then(|rest| rest.strip_suffix('}'))
}
