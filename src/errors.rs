//! Error types for Mediana API operations.

use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Trait for errors that can be classified as transient or permanent.
///
/// The client never retries on its own. This classification exists so callers
/// can plug the client into their own retry policy.
///
/// # Examples
///
/// ```rust
/// use mediana_sms::RetryableError;
///
/// enum MyError {
///     NetworkTimeout,
///     InvalidApiKey,
/// }
///
/// impl RetryableError for MyError {
///     fn is_retryable(&self) -> bool {
///         matches!(self, MyError::NetworkTimeout)
///     }
/// }
///
/// assert!(MyError::NetworkTimeout.is_retryable());
/// assert!(!MyError::InvalidApiKey.is_retryable());
/// ```
pub trait RetryableError {
    /// Returns true if this error represents a transient failure
    /// that might succeed if the same call is issued again.
    ///
    /// Examples: network timeouts, rate limits, provider-side 5xx responses.
    fn is_retryable(&self) -> bool;
}

/// Message used when a failed response body is not a readable error envelope.
pub const PARSE_ERROR_FALLBACK: &str = "failed to parse error response";

/// Structured error returned by the Mediana API for a non-2xx response.
///
/// Every member apart from the HTTP status is optional: a body that could not
/// be decoded only carries the status and [`PARSE_ERROR_FALLBACK`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status of the failed response.
    pub status: StatusCode,
    /// Provider error code (`meta.code`).
    pub code: Option<String>,
    /// Human-readable message (`meta.errorMessage`).
    pub message: Option<String>,
    /// Field-level errors flattened as `"<key>: <message> (code: <errorCode>)"`.
    pub errors: Vec<String>,
    /// The `data` object of the error envelope, if any.
    pub details: Option<Map<String, Value>>,
    /// Set only when the body could not be decoded at all.
    pub(crate) unparsed: bool,
}

impl ApiError {
    /// Error for a failed response whose body could not be decoded.
    pub fn unparsed(status: StatusCode) -> Self {
        Self {
            status,
            code: None,
            message: Some(PARSE_ERROR_FALLBACK.to_string()),
            errors: Vec::new(),
            details: None,
            unparsed: true,
        }
    }

    /// Returns true if the body of the failed response could not be decoded.
    ///
    /// A decoded envelope whose message happens to equal
    /// [`PARSE_ERROR_FALLBACK`] is not reported as unparsed.
    pub fn is_unparsed(&self) -> bool {
        self.unparsed
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = self.message.as_deref().unwrap_or_default();
        write!(f, "API error ({}): {}", self.status.as_u16(), message)?;
        if !self.errors.is_empty() {
            write!(f, " - {}", self.errors.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl RetryableError for ApiError {
    fn is_retryable(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS || self.status.is_server_error()
    }
}

/// Main error type for Mediana client operations.
#[derive(Debug, Error)]
pub enum MedianaError {
    /// Failed to build HTTP client.
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// The configured base URL cannot be used to build endpoint URLs.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Error building an endpoint URL from the base URL.
    #[error("Error building Mediana request URL: {0}")]
    BuildRequestUrl(#[from] url::ParseError),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request body: {0}")]
    SerializeRequest(#[source] serde_json::Error),

    /// Failed to send HTTP request.
    #[error("Failed to send HTTP request: {0}")]
    HttpRequest(#[from] reqwest_middleware::Error),

    /// Failed to read a successful response body.
    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),

    /// The call was cancelled through its cancellation token.
    #[error("Request cancelled")]
    Cancelled,

    /// Mediana rejected the call with a non-2xx response.
    #[error(transparent)]
    Api(ApiError),

    /// A 2xx response body did not match the expected schema.
    #[error("Failed to deserialize JSON response: {0}")]
    DeserializeJson(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MedianaError>;

impl MedianaError {
    /// Returns the structured API error, if the provider rejected the call.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            MedianaError::Api(error) => Some(error),
            _ => None,
        }
    }

    /// Returns true if the call was cancelled through its cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MedianaError::Cancelled)
    }

    /// Returns true if the transport gave up because a configured timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        match self {
            MedianaError::HttpRequest(reqwest_middleware::Error::Reqwest(error))
            | MedianaError::ReadBody(error) => error.is_timeout(),
            _ => false,
        }
    }
}

impl RetryableError for MedianaError {
    fn is_retryable(&self) -> bool {
        match self {
            // Network failures and timeouts
            MedianaError::HttpRequest(_) | MedianaError::ReadBody(_) => true,
            MedianaError::Api(error) => error.is_retryable(),
            // Caller decisions and client-side bugs
            MedianaError::Cancelled
            | MedianaError::BuildHttpClient(_)
            | MedianaError::InvalidBaseUrl { .. }
            | MedianaError::BuildRequestUrl(_)
            | MedianaError::SerializeRequest(_)
            | MedianaError::DeserializeJson(_) => false,
        }
    }
}
