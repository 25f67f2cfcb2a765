//! API credentials
//!
//! Every request is authenticated with HTTP basic auth using the database's
//! API key and secret.

use std::fmt;

/// Immutable key/secret pair used for request authentication
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    /// Create credentials from an API key and secret
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// API key (basic auth username)
    pub fn key(&self) -> &str {
        &self.key
    }

    /// API secret (basic auth password)
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

// Secret stays out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"***")
            .finish()
    }
}
