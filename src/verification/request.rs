//! Request Validator: structural checks on a decoded request.
//!
//! Pure function of the request and the configuration. Runs before any
//! record lookup, so a request refused here never touches the store.

use std::sync::LazyLock;

use regex::Regex;

use super::rules::{Rule, first_violation, is_blank};
use super::types::{PortOutRequest, ReasonCode, ValidationConfig, VerificationOutcome};

/// Matches anywhere in the value: `tel:5551234567x` is accepted.
static TEN_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{10}").expect("valid regex"));

/// Inputs visible to the request rules.
pub struct RequestContext<'a> {
    pub request: &'a PortOutRequest,
    pub config: &'a ValidationConfig,
}

/// The request rules in evaluation order.
pub fn request_rules<'a>() -> [Rule<RequestContext<'a>>; 8] {
    [
        Rule::new(
            "account_number_present",
            ReasonCode::MissingAccountNumber,
            account_number_missing,
        ),
        Rule::new("pin_present", ReasonCode::MissingPin, pin_missing),
        Rule::new(
            "zip_code_present",
            ReasonCode::MissingZipCode,
            zip_code_missing,
        ),
        Rule::new(
            "subscriber_name_present",
            ReasonCode::MissingSubscriberName,
            subscriber_name_missing,
        ),
        Rule::new(
            "telephone_numbers_present",
            ReasonCode::MissingTelephoneNumbers,
            no_telephone_numbers,
        ),
        Rule::new(
            "batch_within_limit",
            ReasonCode::TooManyTelephoneNumbers,
            too_many_telephone_numbers,
        ),
        Rule::new(
            "telephone_numbers_non_empty",
            ReasonCode::InvalidTelephoneNumbers,
            blank_telephone_number,
        ),
        Rule::new(
            "telephone_numbers_have_ten_digits",
            ReasonCode::InvalidTelephoneNumbers,
            malformed_telephone_number,
        ),
    ]
}

fn account_number_missing(ctx: &RequestContext<'_>) -> bool {
    ctx.config.verify_account_number && is_blank(&ctx.request.account_number)
}

fn pin_missing(ctx: &RequestContext<'_>) -> bool {
    ctx.config.verify_pin && is_blank(&ctx.request.pin)
}

fn zip_code_missing(ctx: &RequestContext<'_>) -> bool {
    ctx.config.verify_zip_code && is_blank(&ctx.request.zip_code)
}

fn subscriber_name_missing(ctx: &RequestContext<'_>) -> bool {
    ctx.config.verify_subscriber_name && is_blank(&ctx.request.subscriber_name)
}

fn no_telephone_numbers(ctx: &RequestContext<'_>) -> bool {
    ctx.request.telephone_numbers.is_empty()
}

fn too_many_telephone_numbers(ctx: &RequestContext<'_>) -> bool {
    ctx.request.telephone_numbers.len() > ctx.config.max_telephone_numbers
}

fn blank_telephone_number(ctx: &RequestContext<'_>) -> bool {
    ctx.request
        .telephone_numbers
        .iter()
        .any(|entry| is_blank(&entry.raw))
}

fn malformed_telephone_number(ctx: &RequestContext<'_>) -> bool {
    ctx.request
        .telephone_numbers
        .iter()
        .any(|entry| !has_ten_digit_run(entry.value()))
}

/// `true` if `value` contains ten consecutive ASCII digits somewhere.
pub fn has_ten_digit_run(value: &str) -> bool {
    TEN_DIGIT_RUN.is_match(value)
}

/// Check a decoded request. `None` stands for a body with no usable request.
pub fn validate(
    request: Option<&PortOutRequest>,
    config: &ValidationConfig,
) -> VerificationOutcome {
    let Some(request) = request else {
        return VerificationOutcome::Fail(ReasonCode::InvalidRequest);
    };

    let ctx = RequestContext { request, config };
    first_violation(&request_rules(), &ctx).into()
}
