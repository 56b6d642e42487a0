//! Request and response types for the Mediana API.

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

// =============================================================================
// Envelope
// =============================================================================

/// Status metadata present on every Mediana response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Provider status code, `"0"` on success.
    #[serde(default, deserialize_with = "code_from_string_or_number")]
    pub code: String,
    /// Error message, if the provider attached one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Field-level errors, if the provider attached any.
    ///
    /// A bare string in the list becomes a [`FieldError`] with an empty key.
    #[serde(
        default,
        deserialize_with = "field_errors",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<FieldError>,
}

/// Accept `meta.code` as either a JSON string or a number.
fn code_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(code) => Ok(code),
        Value::Number(code) => Ok(code.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("invalid meta code: {other}"))),
    }
}

/// Deserialize `null` as the type's default value.
///
/// `#[serde(default)]` only covers absent keys; the API also sends explicit
/// nulls for empty members.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn field_errors<'de, D>(deserializer: D) -> Result<Vec<FieldError>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Field(FieldError),
        Message(String),
    }

    let entries: Vec<Option<Entry>> = null_as_default(deserializer)?;
    Ok(entries
        .into_iter()
        .flatten()
        .map(|entry| match entry {
            Entry::Field(error) => error,
            Entry::Message(message) => FieldError {
                errors: vec![message],
                ..FieldError::default()
            },
        })
        .collect())
}

/// Errors reported by the provider for one request field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldError {
    /// Name of the offending field.
    #[serde(deserialize_with = "null_as_default")]
    pub key: String,
    /// Messages for this field, in provider order.
    #[serde(deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
    /// Numeric error code shared by all messages of this field.
    #[serde(deserialize_with = "null_as_default")]
    pub error_code: i64,
}

/// Success envelope wrapping operation-specific `data`.
///
/// A `null` payload decodes as the payload's default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ApiResponse<T> {
    #[serde(deserialize_with = "null_as_default")]
    pub meta: Meta,
    #[serde(deserialize_with = "null_as_default")]
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Discard the envelope and keep the payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

pub type SendSmsResponse = ApiResponse<SendResult>;
pub type PatternResponse = ApiResponse<SendResult>;
pub type OtpResponse = ApiResponse<SendResult>;
pub type DeliveryStatusResponse = ApiResponse<DeliveryStatus>;
pub type BalanceResponse = ApiResponse<Balance>;
pub type LinesResponse = ApiResponse<SendingLines>;
pub type PatternDetailResponse = ApiResponse<PatternDetail>;

// =============================================================================
// RequestId
// =============================================================================

/// Identifier of a send request, used to query its delivery status.
///
/// Send operations return it as the `requestCode` string; parse it with
/// [`str::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Create a new RequestId.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for RequestId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Message category for plain-text sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmsType {
    Informational,
    PromotionalToCustomers,
    PromotionalAll,
}

/// Request body for `POST send/sms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsRequest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub sms_type: Option<SmsType>,
    /// Sending line to use; the account default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sending_number: Option<String>,
    pub recipients: Vec<String>,
    pub message_text: String,
}

impl SendSmsRequest {
    pub fn new<I, S>(recipients: I, message_text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sms_type: None,
            sending_number: None,
            recipients: recipients.into_iter().map(Into::into).collect(),
            message_text: message_text.into(),
        }
    }

    pub fn with_sending_number(mut self, sending_number: impl Into<String>) -> Self {
        self.sending_number = Some(sending_number.into());
        self
    }

    pub fn with_type(mut self, sms_type: SmsType) -> Self {
        self.sms_type = Some(sms_type);
        self
    }
}

/// Request body for `POST send/pattern`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRequest {
    pub recipients: Vec<String>,
    pub pattern_code: String,
    /// Values for the pattern's named placeholders.
    pub parameters: BTreeMap<String, String>,
}

impl PatternRequest {
    pub fn new<I, S>(recipients: I, pattern_code: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            recipients: recipients.into_iter().map(Into::into).collect(),
            pattern_code: pattern_code.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Set one placeholder value, replacing any previous value for `key`.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Request body for `POST send/otp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub pattern_code: String,
    pub recipient: String,
    pub otp_code: String,
}

impl OtpRequest {
    pub fn new(
        pattern_code: impl Into<String>,
        recipient: impl Into<String>,
        otp_code: impl Into<String>,
    ) -> Self {
        Self {
            pattern_code: pattern_code.into(),
            recipient: recipient.into(),
            otp_code: otp_code.into(),
        }
    }
}

// =============================================================================
// Response data
// =============================================================================

/// Per-recipient state of a sent message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmsItemInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub sms_item_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Outcome of a plain, pattern or OTP send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendResult {
    #[serde(deserialize_with = "null_as_default")]
    pub succeed: bool,
    /// Code identifying the send request; see [`RequestId`].
    #[serde(deserialize_with = "null_as_default")]
    pub request_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Items in the order the provider listed them.
    #[serde(deserialize_with = "null_as_default")]
    pub sms_items: Vec<SmsItemInfo>,
}

/// Delivery state of a send request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryStatus {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sms_items: Vec<SmsItemInfo>,
}

/// Account credit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(rename = "Balance", default, deserialize_with = "null_as_default")]
    pub balance: i64,
}

/// A phone number owned by the account and usable as message origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LineInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub number: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_dedicated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_advertisement: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_service: bool,
    pub usable_until: Option<String>,
}

/// Sending lines of the account.
///
/// The endpoint returns either a single line object or an array of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SendingLines(pub Vec<LineInfo>);

impl SendingLines {
    pub fn iter(&self) -> std::slice::Iter<'_, LineInfo> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SendingLines {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<LineInfo>),
            One(LineInfo),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::Many(lines) => Self(lines),
            OneOrMany::One(line) => Self(vec![line]),
        })
    }
}

impl IntoIterator for SendingLines {
    type Item = LineInfo;
    type IntoIter = std::vec::IntoIter<LineInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Metadata of a message pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatternDetail {
    #[serde(deserialize_with = "null_as_default")]
    pub message_pattern_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "type")]
    pub pattern_type: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_usable: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub the_pattern: PatternBody,
    #[serde(deserialize_with = "null_as_default")]
    pub setting_info: PatternSettingInfo,
    /// Previous revisions of the pattern text.
    #[serde(deserialize_with = "null_as_default")]
    pub patterns: Vec<PatternRevision>,
    pub create_date: Option<String>,
}

/// Current text and approval state of a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatternBody {
    #[serde(deserialize_with = "null_as_default")]
    pub pattern: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub sending_number: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_locked_by_sending_number: bool,
    pub approval_description: Option<String>,
    #[serde(
        rename = "GetMessagePatternsByIdResponseField",
        deserialize_with = "null_as_default"
    )]
    pub fields: Vec<PatternField>,
}

/// A named placeholder of a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatternField {
    #[serde(deserialize_with = "null_as_default")]
    pub field_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub field_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub max_characters: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub field_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatternSettingInfo {
    pub website: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub average_sending_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PatternRevision {
    #[serde(deserialize_with = "null_as_default")]
    pub pattern: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}
