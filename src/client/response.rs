//! Response wrapping
//!
//! [`Response`] normalizes a transport outcome into a tagged success/failure
//! value. Decoding goes through [`FromResponse`] so that payload-less
//! operations ([`Nothing`]) and paginated ones ([`Segment`]) can read the
//! parts of the response they need.

use crate::client::cursor::Segment;
use crate::client::transport::RawResponse;
use crate::client::{ClientError, ClientResult};
use crate::model::{DeleteSummary, Nothing, Series, SingleValue, Summary};
use tracing::warn;

/// Status code recorded when no HTTP response was received
pub const TRANSPORT_FAILURE_CODE: u16 = 0;

/// Outcome tag of a [`Response`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// 2xx status and a decoded payload
    Success,
    /// Non-2xx status, transport failure or undecodable body
    Failure,
}

/// Decode a payload from a successful raw response
pub trait FromResponse: Sized {
    /// Build `Self` from the response body (and headers, if needed)
    ///
    /// # Errors
    /// Returns `ClientError::Parse` if the body has the wrong shape
    fn from_response(raw: &RawResponse) -> ClientResult<Self>;
}

/// Decode the body as JSON
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(raw: &RawResponse) -> ClientResult<T> {
    serde_json::from_str(&raw.body)
        .map_err(|e| ClientError::Parse(format!("Failed to deserialize response: {e}")))
}

macro_rules! json_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromResponse for $ty {
                fn from_response(raw: &RawResponse) -> ClientResult<Self> {
                    decode_json(raw)
                }
            }
        )*
    };
}

json_response!(Series, SingleValue, Summary, DeleteSummary, serde_json::Value);

impl FromResponse for Nothing {
    fn from_response(_raw: &RawResponse) -> ClientResult<Self> {
        Ok(Nothing)
    }
}

/// Result of one API call
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    state: State,
    code: u16,
    message: String,
    value: Option<T>,
}

impl<T> Response<T> {
    /// Successful response carrying `value`
    pub fn success(code: u16, message: impl Into<String>, value: T) -> Self {
        Self {
            state: State::Success,
            code,
            message: message.into(),
            value: Some(value),
        }
    }

    /// Failed response
    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self {
            state: State::Failure,
            code,
            message: message.into(),
            value: None,
        }
    }

    /// Outcome tag
    pub fn state(&self) -> State {
        self.state
    }

    /// True when the state is [`State::Success`]
    pub fn is_success(&self) -> bool {
        self.state == State::Success
    }

    /// HTTP status code, or [`TRANSPORT_FAILURE_CODE`]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Human readable status or error text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Payload, present only on success
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Convert into a `Result`, turning failures into `ClientError::Api`
    ///
    /// # Errors
    /// Returns `ClientError::Api` carrying this response's code and message
    pub fn into_result(self) -> ClientResult<T> {
        match (self.state, self.value) {
            (State::Success, Some(value)) => Ok(value),
            _ => Err(ClientError::Api {
                code: self.code,
                message: self.message,
            }),
        }
    }

    /// Map the payload, keeping code and message
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            state: self.state,
            code: self.code,
            message: self.message,
            value: self.value.map(f),
        }
    }
}

impl<T: FromResponse> Response<T> {
    /// Wrap a transport outcome
    ///
    /// 2xx responses are decoded into `T`; a decode failure is a Failure,
    /// never a default-valued Success. Transport errors are recorded with
    /// code [`TRANSPORT_FAILURE_CODE`].
    pub fn from_transport(outcome: ClientResult<RawResponse>) -> Self {
        let raw = match outcome {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Request failed before a response was received: {}", e);
                return Self::failure(TRANSPORT_FAILURE_CODE, e.to_string());
            }
        };

        if !raw.is_success() {
            let message = failure_message(&raw);
            warn!("Request failed with status {}: {}", raw.status, message);
            return Self::failure(raw.status, message);
        }

        match T::from_response(&raw) {
            Ok(value) => Self::success(raw.status, status_text(raw.status), value),
            Err(e) => {
                warn!("Status {} but body could not be decoded: {}", raw.status, e);
                Self::failure(raw.status, e.to_string())
            }
        }
    }
}

fn status_text(code: u16) -> String {
    reqwest::StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

/// Server-provided error text, falling back to the status reason
fn failure_message(raw: &RawResponse) -> String {
    let body = raw.body.trim();
    if body.is_empty() {
        status_text(raw.status)
    } else {
        body.to_string()
    }
}

impl<T: serde::de::DeserializeOwned> FromResponse for Segment<T> {
    fn from_response(raw: &RawResponse) -> ClientResult<Self> {
        Segment::from_raw(raw)
    }
}
