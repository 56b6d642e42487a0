//! Mediana HTTP client.

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::errors::{MedianaError, Result};
use crate::response::{parse_api_error, parse_success};
use crate::types::{
    BalanceResponse, DeliveryStatusResponse, LinesResponse, OtpRequest, OtpResponse,
    PatternDetailResponse, PatternRequest, PatternResponse, RequestId, SendSmsRequest,
    SendSmsResponse,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug, warn};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

const APPLICATION_JSON: &str = "application/json";

/// Mediana SMS HTTP client.
///
/// Every operation issues exactly one HTTP request and never retries. The
/// client is cheap to clone and can be shared between tasks.
///
/// # Example
///
/// ```rust,no_run
/// use mediana_sms::{MedianaClient, SendSmsRequest};
///
/// # async fn run() -> mediana_sms::Result<()> {
/// let client = MedianaClient::with_api_key("your_api_key")?;
///
/// let request = SendSmsRequest::new(["09123456789"], "Hello!").with_sending_number("3000");
/// let response = client.send_sms(&request).await?;
/// println!("Request code: {}", response.data.request_code);
///
/// let balance = client.get_account_balance().await?;
/// println!("Balance: {}", balance.data.balance);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MedianaClient {
    http_client: ClientWithMiddleware,
    api_key: SecretString,
    base_url: Url,
    cancellation: Option<CancellationToken>,
}

impl std::fmt::Debug for MedianaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedianaClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

/// Builder for configuring a [`MedianaClient`].
pub struct MedianaClientBuilder {
    api_key: String,
    config: ClientConfig,
    http_client: Option<ClientWithMiddleware>,
}

impl MedianaClientBuilder {
    /// Create a new builder with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            config: ClientConfig::default(),
            http_client: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a custom API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set a total timeout for each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set a custom HTTP client with middleware.
    ///
    /// Timeouts and user agent from the configuration are not applied to an
    /// injected client.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the [`MedianaClient`].
    pub fn build(self) -> Result<MedianaClient> {
        let base_url = self.config.parsed_base_url()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder =
                    reqwest::Client::builder().user_agent(self.config.user_agent.as_str());
                if let Some(timeout) = self.config.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(timeout) = self.config.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                let client = builder.build().map_err(MedianaError::BuildHttpClient)?;
                ClientBuilder::new(client).build()
            }
        };

        Ok(MedianaClient {
            http_client,
            api_key: SecretString::from(self.api_key),
            base_url,
            cancellation: None,
        })
    }
}

impl MedianaClient {
    /// Create a new Mediana client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL for the Mediana API
    /// * `api_key` - API key for authentication
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).base_url(base_url).build()
    }

    /// Create a new client with the default API URL.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> MedianaClientBuilder {
        MedianaClientBuilder::new(api_key)
    }

    /// Base URL all endpoints are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Return a client whose calls are aborted once `token` is cancelled.
    ///
    /// A cancelled call drops its in-flight request and returns
    /// [`MedianaError::Cancelled`]. If the token is already cancelled, nothing
    /// is sent.
    ///
    /// ```rust,no_run
    /// use mediana_sms::{CancellationToken, MedianaClient};
    ///
    /// # async fn run(client: MedianaClient) {
    /// let token = CancellationToken::new();
    /// let scoped = client.with_cancellation(token.clone());
    ///
    /// token.cancel();
    /// let err = scoped.get_account_balance().await.unwrap_err();
    /// assert!(err.is_cancelled());
    /// # }
    /// ```
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancellation: Some(token),
            ..self.clone()
        }
    }

    /// Send a plain-text SMS to one or more recipients.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "MedianaClient::send_sms",
            skip_all,
            fields(
                recipients = request.recipients.len(),
                request_code = tracing::field::Empty
            )
        )
    )]
    pub async fn send_sms(&self, request: &SendSmsRequest) -> Result<SendSmsResponse> {
        let response: SendSmsResponse = self.post(&Endpoint::SEND_SMS, request).await?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("request_code", response.data.request_code.as_str())
                .set_status(Status::Ok);
        }

        Ok(response)
    }

    /// Send a pattern (template) SMS filled with the request parameters.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "MedianaClient::send_pattern_sms",
            skip_all,
            fields(
                pattern_code = %request.pattern_code,
                recipients = request.recipients.len(),
                request_code = tracing::field::Empty
            )
        )
    )]
    pub async fn send_pattern_sms(&self, request: &PatternRequest) -> Result<PatternResponse> {
        let response: PatternResponse = self.post(&Endpoint::SEND_PATTERN, request).await?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("request_code", response.data.request_code.as_str())
                .set_status(Status::Ok);
        }

        Ok(response)
    }

    /// Send a one-time password through an OTP pattern.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "MedianaClient::send_otp",
            skip_all,
            fields(
                pattern_code = %request.pattern_code,
                request_code = tracing::field::Empty
            )
        )
    )]
    pub async fn send_otp(&self, request: &OtpRequest) -> Result<OtpResponse> {
        let response: OtpResponse = self.post(&Endpoint::SEND_OTP, request).await?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("request_code", response.data.request_code.as_str())
                .set_status(Status::Ok);
        }

        Ok(response)
    }

    /// Get the delivery status of a send request.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "MedianaClient::get_delivery_status",
            skip_all,
            fields(request_id = %request_id, status = tracing::field::Empty)
        )
    )]
    pub async fn get_delivery_status(
        &self,
        request_id: RequestId,
    ) -> Result<DeliveryStatusResponse> {
        let id = request_id.to_string();
        let response: DeliveryStatusResponse =
            self.get(&Endpoint::DELIVERY_STATUS, Some(&id)).await?;

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("status", response.data.status.as_str())
                .set_status(Status::Ok);
        }

        Ok(response)
    }

    /// Get the account balance.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "MedianaClient::get_account_balance", skip_all)
    )]
    pub async fn get_account_balance(&self) -> Result<BalanceResponse> {
        self.get(&Endpoint::ACCOUNT_BALANCE, None).await
    }

    /// Get the sending lines of the account.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "MedianaClient::get_sending_lines", skip_all)
    )]
    pub async fn get_sending_lines(&self) -> Result<LinesResponse> {
        self.get(&Endpoint::SENDING_LINES, None).await
    }

    /// Get the metadata of a pattern by its code.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "MedianaClient::get_pattern_detail",
            skip_all,
            fields(pattern_code = %pattern_code)
        )
    )]
    pub async fn get_pattern_detail(&self, pattern_code: &str) -> Result<PatternDetailResponse> {
        self.get(&Endpoint::PATTERN_DETAIL, Some(pattern_code)).await
    }

    async fn post<B, T>(&self, endpoint: &Endpoint, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(MedianaError::SerializeRequest)?;
        self.dispatch(endpoint, None, Some(body)).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &Endpoint, param: Option<&str>) -> Result<T> {
        self.dispatch(endpoint, param, None).await
    }

    /// Run one request/response exchange, racing it against the cancellation
    /// token if one is attached.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        param: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<T> {
        let exchange = async {
            let response = self.send_request(endpoint, param, body).await?;
            decode_response(response).await
        };

        let Some(token) = &self.cancellation else {
            return exchange.await;
        };

        tokio::select! {
            biased;
            () = token.cancelled() => {
                #[cfg(feature = "tracing")]
                debug!(path = endpoint.path(), "Mediana request cancelled");
                Err(MedianaError::Cancelled)
            }
            result = exchange => result,
        }
    }

    /// Send a request and return the response if its status is 2xx.
    ///
    /// Any other status is turned into [`MedianaError::Api`] from the
    /// response body.
    async fn send_request(
        &self,
        endpoint: &Endpoint,
        param: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response> {
        let url = endpoint.url(&self.base_url, param)?;

        #[cfg(feature = "tracing")]
        debug!(
            method = %endpoint.method(),
            url = %url,
            path_param = endpoint.path_param(),
            "Sending Mediana request"
        );

        let mut request = self
            .http_client
            .request(endpoint.method().clone(), url)
            .bearer_auth(self.api_key.expose_secret())
            .header(ACCEPT, APPLICATION_JSON);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, APPLICATION_JSON).body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // An unreadable error body still yields a structured error
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                warn!(status = %status, error = %_e, "Failed to read Mediana error body");
                Default::default()
            }
        };

        Err(MedianaError::Api(parse_api_error(status, &body)))
    }
}

async fn decode_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.bytes().await.map_err(MedianaError::ReadBody)?;
    parse_success(&body).map_err(MedianaError::DeserializeJson)
}
