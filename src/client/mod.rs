//! HTTP client for the TempoDB API
//!
//! The [`TempoDb`] facade composes the pieces in this module: a
//! [`request::Request`] is built from a URL template, the
//! [`params::ParamEncoder`] adds query parameters, a [`transport::Transport`]
//! executes it, and [`response::Response`] wraps the outcome. Paginated reads
//! hand the first page to [`cursor::Cursor`], which fetches the rest on demand.

pub mod config;
pub mod cursor;
pub mod params;
pub mod request;
pub mod response;
pub mod tempodb;
pub mod transport;

pub use config::ClientConfig;
pub use cursor::{Cursor, QueryResult, Segment, SegmentEnumerator};
pub use request::{Method, Request};
pub use response::{FromResponse, Response, State};
pub use tempodb::TempoDb;
pub use transport::{HttpTransport, RawResponse, Transport};

/// Client errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Non-success status returned by the service
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code (0 when the request never reached the service)
        code: u16,
        /// Server-provided or transport error text
        message: String,
    },

    /// Connection failure or timeout
    #[error("network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("parse error: {0}")]
    Parse(String),

    /// Request body could not be encoded
    #[error("serialize error: {0}")]
    Serialize(String),

    /// Request URL could not be formed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
