//! Response parsing for the Mediana API.

use crate::errors::ApiError;
use crate::types::null_as_default;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[cfg(feature = "tracing")]
use tracing::warn;

/// Error envelope returned with non-2xx responses.
///
/// Every member is optional so that a partial envelope still yields as much
/// information as it carries.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    #[serde(deserialize_with = "null_as_default")]
    meta: ErrorMeta,
    data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ErrorMeta {
    code: Option<Value>,
    error_message: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    errors: Vec<Option<ErrorEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEntry {
    Group(FieldErrorGroup),
    Message(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FieldErrorGroup {
    #[serde(deserialize_with = "null_as_default")]
    key: String,
    #[serde(deserialize_with = "null_as_default")]
    errors: Vec<Option<String>>,
    #[serde(deserialize_with = "null_as_default")]
    error_code: i64,
}

impl ErrorEnvelope {
    fn into_api_error(self, status: StatusCode) -> ApiError {
        let code = self.meta.code.and_then(|code| match code {
            Value::Null => None,
            Value::String(code) => Some(code),
            other => Some(other.to_string()),
        });

        let errors = self
            .meta
            .errors
            .into_iter()
            .flatten()
            .flat_map(|entry| match entry {
                ErrorEntry::Group(FieldErrorGroup {
                    key,
                    errors,
                    error_code,
                }) => errors
                    .into_iter()
                    .flatten()
                    .map(|message| format!("{key}: {message} (code: {error_code})"))
                    .collect(),
                ErrorEntry::Message(message) => vec![message],
            })
            .collect();

        let details = match self.data {
            Some(Value::Object(details)) => Some(details),
            _ => None,
        };

        ApiError {
            status,
            code,
            message: self.meta.error_message,
            errors,
            details,
            unparsed: false,
        }
    }
}

/// Parse the body of a failed response into an [`ApiError`].
///
/// A body that is not a JSON error envelope yields [`ApiError::unparsed`]
/// carrying only `status`. Exactly one `warn!` event is emitted per call.
pub(crate) fn parse_api_error(status: StatusCode, body: &[u8]) -> ApiError {
    let envelope = match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_e) => {
            #[cfg(feature = "tracing")]
            warn!(
                status = %status,
                error = %_e,
                body_len = body.len(),
                "Could not decode Mediana error envelope"
            );
            return ApiError::unparsed(status);
        }
    };

    let error = envelope.into_api_error(status);

    #[cfg(feature = "tracing")]
    warn!(
        status = %error.status,
        code = error.code.as_deref().unwrap_or_default(),
        message = error.message.as_deref().unwrap_or_default(),
        field_errors = error.errors.len(),
        "Mediana API returned error"
    );

    error
}

/// Parse the body of a successful response into its typed envelope.
pub(crate) fn parse_success<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PARSE_ERROR_FALLBACK;
    use crate::types::BalanceResponse;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_flattens_field_errors_in_order() {
        let body = body(json!({
            "meta": {
                "code": "400",
                "errorMessage": "Validation failed",
                "errors": [
                    {"key": "recipients", "errors": ["is required", "must be a list"], "errorCode": 1001},
                    {"key": "patternCode", "errors": [], "errorCode": 1002},
                    {"key": "messageText", "errors": ["too long"], "errorCode": 1003}
                ]
            },
            "data": {"traceId": "t-1"}
        }));

        let error = parse_api_error(StatusCode::BAD_REQUEST, &body);

        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.code.as_deref(), Some("400"));
        assert_eq!(error.message.as_deref(), Some("Validation failed"));
        assert_eq!(
            error.errors,
            vec![
                "recipients: is required (code: 1001)",
                "recipients: must be a list (code: 1001)",
                "messageText: too long (code: 1003)",
            ]
        );
        assert_eq!(
            error.details.as_ref().and_then(|d| d.get("traceId")),
            Some(&json!("t-1"))
        );
    }

    #[test]
    fn test_error_count_is_sum_of_messages() {
        let groups: Vec<Value> = (0..5)
            .map(|i| {
                let messages: Vec<String> = (0..i).map(|j| format!("m{j}")).collect();
                json!({"key": format!("k{i}"), "errors": messages, "errorCode": i})
            })
            .collect();
        let body = body(json!({"meta": {"code": "422", "errorMessage": "bad", "errors": groups}}));

        let error = parse_api_error(StatusCode::UNPROCESSABLE_ENTITY, &body);

        assert_eq!(error.errors.len(), 1 + 2 + 3 + 4);
        assert_eq!(error.errors.first().unwrap(), "k1: m0 (code: 1)");
        assert_eq!(error.errors.last().unwrap(), "k4: m3 (code: 4)");
    }

    #[test]
    fn test_non_json_body_falls_back() {
        let error = parse_api_error(
            StatusCode::BAD_GATEWAY,
            b"<html><body>502 Bad Gateway</body></html>",
        );

        assert_eq!(error.status, StatusCode::BAD_GATEWAY);
        assert_eq!(error.message.as_deref(), Some(PARSE_ERROR_FALLBACK));
        assert!(error.code.is_none());
        assert!(error.errors.is_empty());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_truncated_and_empty_bodies_fall_back() {
        let bodies: [&[u8]; 3] = [b"{\"meta\": {\"code\": \"40", b"", b"   "];
        for body in bodies {
            let error = parse_api_error(StatusCode::UNAUTHORIZED, body);
            assert!(error.is_unparsed(), "body {body:?} should fall back");
            assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_wrong_shape_falls_back() {
        let error = parse_api_error(StatusCode::BAD_REQUEST, &body(json!(["not", "an", "object"])));
        assert!(error.is_unparsed());
    }

    #[test]
    fn test_missing_members_are_tolerated() {
        let error = parse_api_error(
            StatusCode::FORBIDDEN,
            &body(json!({"meta": {"errorMessage": "Forbidden"}, "extra": true})),
        );

        assert!(!error.is_unparsed());
        assert!(error.code.is_none());
        assert_eq!(error.message.as_deref(), Some("Forbidden"));
        assert!(error.errors.is_empty());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_numeric_code_is_kept() {
        let error = parse_api_error(
            StatusCode::TOO_MANY_REQUESTS,
            &body(json!({"meta": {"code": 429, "errorMessage": "slow down", "errors": null}})),
        );
        assert_eq!(error.code.as_deref(), Some("429"));
    }

    #[test]
    fn test_null_members_keep_the_envelope() {
        let body = body(json!({
            "meta": {
                "code": "400",
                "errorMessage": "Validation failed",
                "errors": [
                    {"key": "recipients", "errors": null, "errorCode": 1001},
                    {"key": null, "errors": ["empty", null], "errorCode": null},
                    null,
                    {"key": "messageText", "errors": ["too long"], "errorCode": 1003}
                ]
            },
            "data": {"traceId": "t-2"}
        }));

        let error = parse_api_error(StatusCode::BAD_REQUEST, &body);

        assert!(!error.is_unparsed());
        assert_eq!(error.code.as_deref(), Some("400"));
        assert_eq!(error.message.as_deref(), Some("Validation failed"));
        assert_eq!(
            error.errors,
            vec![": empty (code: 0)", "messageText: too long (code: 1003)"]
        );
        assert!(error.details.is_some());
    }

    #[test]
    fn test_plain_string_errors_are_kept() {
        let body = body(json!({
            "meta": {
                "code": 401,
                "errorMessage": "Unauthorized",
                "errors": ["token expired", {"key": "apiKey", "errors": ["revoked"], "errorCode": 9}]
            }
        }));

        let error = parse_api_error(StatusCode::UNAUTHORIZED, &body);

        assert_eq!(
            error.errors,
            vec!["token expired", "apiKey: revoked (code: 9)"]
        );
    }

    #[test]
    fn test_null_meta_and_non_object_data() {
        let error = parse_api_error(
            StatusCode::BAD_REQUEST,
            &body(json!({"meta": null, "data": "not an object"})),
        );
        assert!(!error.is_unparsed());
        assert!(error.code.is_none());
        assert!(error.details.is_none());

        let error = parse_api_error(
            StatusCode::BAD_REQUEST,
            &body(json!({"meta": {"code": "400"}, "data": [1, 2]})),
        );
        assert_eq!(error.code.as_deref(), Some("400"));
        assert!(error.details.is_none());
    }

    #[test]
    fn test_fallback_text_from_provider_is_not_unparsed() {
        let error = parse_api_error(
            StatusCode::BAD_REQUEST,
            &body(json!({"meta": {"errorMessage": PARSE_ERROR_FALLBACK}})),
        );

        assert!(error.code.is_none());
        assert_eq!(error.message.as_deref(), Some(PARSE_ERROR_FALLBACK));
        assert!(!error.is_unparsed());
    }

    #[cfg(feature = "tracing")]
    mod logging {
        use super::*;
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use tracing::span::{Attributes, Id, Record};
        use tracing::{Event, Metadata, Subscriber};

        /// Counts events, ignores spans.
        struct EventCounter(Arc<AtomicUsize>);

        impl Subscriber for EventCounter {
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }

            fn new_span(&self, _: &Attributes<'_>) -> Id {
                Id::from_u64(1)
            }

            fn record(&self, _: &Id, _: &Record<'_>) {}

            fn record_follows_from(&self, _: &Id, _: &Id) {}

            fn event(&self, _: &Event<'_>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }

            fn enter(&self, _: &Id) {}

            fn exit(&self, _: &Id) {}
        }

        fn warnings_for(body: &[u8]) -> usize {
            let count = Arc::new(AtomicUsize::new(0));
            let subscriber = EventCounter(Arc::clone(&count));
            tracing::subscriber::with_default(subscriber, || {
                parse_api_error(StatusCode::BAD_GATEWAY, body);
            });
            count.load(Ordering::SeqCst)
        }

        #[test]
        fn test_fallback_logs_once() {
            assert_eq!(warnings_for(b"<html>502</html>"), 1);
        }

        #[test]
        fn test_decoded_error_logs_once() {
            assert_eq!(
                warnings_for(br#"{"meta":{"code":"502","errorMessage":"upstream"}}"#),
                1
            );
        }
    }

    #[test]
    fn test_parse_success() {
        let response: BalanceResponse =
            parse_success(br#"{"meta":{"code":"0"},"data":{"Balance":1500}}"#).unwrap();
        assert_eq!(response.data.balance, 1500);

        assert!(parse_success::<BalanceResponse>(br#"{"meta":{"code":"0"}}"#).is_err());
    }
}
