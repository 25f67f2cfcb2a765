//! Client configuration
//!
//! Host, port, API version and scheme are fixed at construction time. There
//! is no environment or file based configuration.

use std::time::Duration;

/// Default API host
pub const DEFAULT_HOST: &str = "api.tempo-db.com";

/// Default API port
pub const DEFAULT_PORT: u16 = 443;

/// Default API version path segment
pub const DEFAULT_VERSION: &str = "v1";

/// Per-request timeout in milliseconds.
/// Reads over long intervals can take a while server side, so this is
/// generous; there is no retry on expiry.
pub const DEFAULT_TIMEOUT_MS: u64 = 50_000;

/// Client identification sent as `User-Agent`
pub const USER_AGENT: &str = concat!("tempodb-rust/", env!("CARGO_PKG_VERSION"));

/// Connection settings for a [`crate::TempoDb`] client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API host name
    pub host: String,
    /// API port
    pub port: u16,
    /// Version path segment (e.g. `v1`)
    pub version: String,
    /// Use https when true, http otherwise
    pub secure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            version: DEFAULT_VERSION.to_string(),
            secure: true,
        }
    }
}

impl ClientConfig {
    /// Set the host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the version segment
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Choose https (`true`) or http (`false`)
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Scheme, host and port, without a trailing slash
    ///
    /// Port 80 is left implicit; every other port is spelled out.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        if self.port == 80 {
            format!("{scheme}://{}", self.host)
        } else {
            format!("{scheme}://{}:{}", self.host, self.port)
        }
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(DEFAULT_TIMEOUT_MS)
    }
}
