//! # Mediana SMS
//!
//! A typed client for the Mediana SMS HTTP API.
//!
//! This library covers plain-text, pattern (template) and one-time-password
//! sends, plus the account queries the API offers: balance, sending lines,
//! pattern metadata and delivery status.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mediana_sms::{MedianaClient, OtpRequest, PatternRequest, SendSmsRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MedianaClient::with_api_key("your_api_key")?;
//!
//!     // Plain text
//!     let request = SendSmsRequest::new(["09123456789"], "Hello!").with_sending_number("3000");
//!     let sent = client.send_sms(&request).await?;
//!     println!("Request code: {}", sent.data.request_code);
//!
//!     // Pattern
//!     let request = PatternRequest::new(["09123456789"], "welcome").with_parameter("name", "Sara");
//!     client.send_pattern_sms(&request).await?;
//!
//!     // OTP
//!     client
//!         .send_otp(&OtpRequest::new("otp-pattern", "09123456789", "123456"))
//!         .await?;
//!
//!     // Delivery status
//!     let status = client
//!         .get_delivery_status(sent.data.request_code.parse()?)
//!         .await?;
//!     println!("Status: {}", status.data.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`MedianaError`]:
//!
//! - transport failures (`HttpRequest`, `ReadBody`, `Cancelled`) are never
//!   turned into API errors;
//! - a non-2xx response becomes [`MedianaError::Api`] holding an [`ApiError`]
//!   decoded from the provider error envelope;
//! - a 2xx response whose body does not match the expected schema becomes
//!   [`MedianaError::DeserializeJson`].
//!
//! The client never retries. [`RetryableError`] tells callers which errors
//! are worth retrying under their own policy.
//!
//! ## Features
//!
//! - `tracing` - tracing spans and events with OpenTelemetry span status (enabled by default)

pub mod client;
pub mod config;
pub mod endpoint;
pub mod errors;
mod response;
pub mod types;

// Re-export commonly used types at the crate root
pub use client::{MedianaClient, MedianaClientBuilder};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use endpoint::Endpoint;
pub use errors::{ApiError, MedianaError, Result, RetryableError};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    ApiResponse, Balance, BalanceResponse, DeliveryStatus, DeliveryStatusResponse, FieldError,
    LineInfo, LinesResponse, Meta, OtpRequest, OtpResponse, PatternDetail, PatternDetailResponse,
    PatternRequest, PatternResponse, RequestId, SendResult, SendSmsRequest, SendSmsResponse,
    SendingLines, SmsItemInfo, SmsType,
};
