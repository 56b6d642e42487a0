//! Endpoint descriptors for the Mediana API.

use crate::errors::{MedianaError, Result};
use reqwest::Method;
use url::Url;

/// HTTP method and relative path of one API operation.
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: Method,
    path: &'static str,
    path_param: Option<&'static str>,
}

impl Endpoint {
    pub const SEND_SMS: Endpoint = Endpoint::new(Method::POST, "send/sms", None);
    pub const SEND_PATTERN: Endpoint = Endpoint::new(Method::POST, "send/pattern", None);
    pub const SEND_OTP: Endpoint = Endpoint::new(Method::POST, "send/otp", None);
    pub const DELIVERY_STATUS: Endpoint =
        Endpoint::new(Method::GET, "send-requests/status", Some("id"));
    pub const ACCOUNT_BALANCE: Endpoint = Endpoint::new(Method::GET, "account/balance", None);
    pub const SENDING_LINES: Endpoint = Endpoint::new(Method::GET, "account/lines", None);
    pub const PATTERN_DETAIL: Endpoint = Endpoint::new(Method::GET, "get/pattern", Some("code"));

    const fn new(method: Method, path: &'static str, path_param: Option<&'static str>) -> Self {
        Self {
            method,
            path,
            path_param,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Relative path without the path parameter.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Name of the trailing path parameter, if the endpoint takes one.
    pub fn path_param(&self) -> Option<&'static str> {
        self.path_param
    }

    /// Resolve the endpoint against `base`, appending `param` as one
    /// percent-encoded path segment.
    pub(crate) fn url(&self, base: &Url, param: Option<&str>) -> Result<Url> {
        debug_assert_eq!(
            self.path_param.is_some(),
            param.is_some(),
            "path parameter mismatch for {}",
            self.path
        );

        let mut url = base.join(self.path)?;
        if let Some(param) = param {
            url.path_segments_mut()
                .map_err(|()| MedianaError::InvalidBaseUrl {
                    url: base.to_string(),
                    reason: "cannot be a base".to_string(),
                })?
                .push(param);
        }

        Ok(url)
    }
}
