//! Core types for port-out verification.

use std::fmt;

use serde::Deserialize;

/// Rule switches and limits for one process. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    #[serde(default = "default_true")]
    pub verify_account_number: bool,
    #[serde(default = "default_true")]
    pub verify_pin: bool,
    #[serde(default = "default_true")]
    pub verify_zip_code: bool,
    #[serde(default = "default_true")]
    pub verify_status: bool,
    #[serde(default)]
    pub verify_subscriber_name: bool,
    /// Largest batch of telephone numbers accepted in one request.
    #[serde(default = "default_max_telephone_numbers")]
    pub max_telephone_numbers: usize,
}

fn default_true() -> bool {
    true
}

fn default_max_telephone_numbers() -> usize {
    100
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            verify_account_number: true,
            verify_pin: true,
            verify_zip_code: true,
            verify_status: true,
            verify_subscriber_name: false,
            max_telephone_numbers: default_max_telephone_numbers(),
        }
    }
}

/// One `<TelephoneNumber>` element as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelephoneNumberEntry {
    pub raw: Option<String>,
}

impl TelephoneNumberEntry {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    /// The submitted value, or `""` when the element was empty.
    pub fn value(&self) -> &str {
        self.raw.as_deref().unwrap_or_default()
    }
}

/// A decoded port-out validation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortOutRequest {
    pub account_number: Option<String>,
    pub pin: Option<String>,
    pub zip_code: Option<String>,
    pub subscriber_name: Option<String>,
    /// In document order. Empty when the element was absent.
    pub telephone_numbers: Vec<TelephoneNumberEntry>,
}

impl PortOutRequest {
    pub fn with_account_number(mut self, value: impl Into<String>) -> Self {
        self.account_number = Some(value.into());
        self
    }

    pub fn with_pin(mut self, value: impl Into<String>) -> Self {
        self.pin = Some(value.into());
        self
    }

    pub fn with_zip_code(mut self, value: impl Into<String>) -> Self {
        self.zip_code = Some(value.into());
        self
    }

    pub fn with_subscriber_name(mut self, value: impl Into<String>) -> Self {
        self.subscriber_name = Some(value.into());
        self
    }

    pub fn with_telephone_number(mut self, value: impl Into<String>) -> Self {
        self.telephone_numbers.push(TelephoneNumberEntry::new(value));
        self
    }

    /// Raw telephone number values in request order, for the batched lookup.
    pub fn telephone_number_values(&self) -> Vec<String> {
        self.telephone_numbers
            .iter()
            .map(|entry| entry.value().to_string())
            .collect()
    }
}

/// Stored reference data for one telephone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberRecord {
    pub telephone_number: String,
    pub account_number: String,
    pub pin: String,
    pub zip_code: String,
    /// `1` means active.
    pub status: i64,
    pub subscriber_name: String,
}

/// Why a request was refused.
///
/// Several variants share a wire code: the code is the external contract,
/// the variant is what the logs report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    InvalidRequest,
    MissingAccountNumber,
    UnknownAccountNumber,
    MissingPin,
    UnknownPin,
    MissingZipCode,
    UnknownZipCode,
    UnknownTelephoneNumber,
    TooManyTelephoneNumbers,
    InactiveStatus,
    MissingSubscriberName,
    UnknownSubscriberName,
    MissingTelephoneNumbers,
    InvalidTelephoneNumbers,
    UnexpectedError,
}

impl ReasonCode {
    /// Numeric code carried in the response body.
    pub fn code(self) -> u16 {
        match self {
            Self::MissingAccountNumber => 7510,
            Self::UnknownAccountNumber => 7511,
            Self::MissingPin => 7512,
            Self::UnknownPin => 7513,
            Self::MissingZipCode => 7514,
            Self::UnknownZipCode => 7515,
            Self::UnknownTelephoneNumber => 7516,
            Self::TooManyTelephoneNumbers => 7517,
            Self::InactiveStatus => 7518,
            Self::MissingSubscriberName | Self::UnknownSubscriberName => 7519,
            Self::InvalidRequest
            | Self::MissingTelephoneNumbers
            | Self::InvalidTelephoneNumbers
            | Self::UnexpectedError => 7598,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::MissingAccountNumber => "Missing account number",
            Self::UnknownAccountNumber => "Unknown account number",
            Self::MissingPin => "Missing pin",
            Self::UnknownPin => "Unknown pin",
            Self::MissingZipCode => "Missing zip code",
            Self::UnknownZipCode => "Unknown zip code",
            Self::UnknownTelephoneNumber => "Unknown telephone number",
            Self::TooManyTelephoneNumbers => "Too many telephone numbers",
            Self::InactiveStatus => "Inactive status",
            Self::MissingSubscriberName => "Missing subscriber name",
            Self::UnknownSubscriberName => "Unknown subscriber name",
            Self::MissingTelephoneNumbers => "Missing telephone numbers",
            Self::InvalidTelephoneNumbers => "Invalid telephone numbers",
            Self::UnexpectedError => "Unexpected error",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.description(), self.code())
    }
}

/// Verdict for a whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Pass,
    Fail(ReasonCode),
}

impl VerificationOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Wire code of a failure; `None` on pass.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Pass => None,
            Self::Fail(reason) => Some(reason.code()),
        }
    }

    pub fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Pass => None,
            Self::Fail(reason) => Some(*reason),
        }
    }
}

impl From<Option<ReasonCode>> for VerificationOutcome {
    fn from(violation: Option<ReasonCode>) -> Self {
        violation.map_or(Self::Pass, Self::Fail)
    }
}
