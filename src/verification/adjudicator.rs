//! Record Adjudicator: cross-checks a validated request against stored records.
//!
//! Telephone numbers are visited in request order and the first number that
//! fails any enabled check decides the verdict for the whole batch. The
//! records are looked up by the caller beforehand; nothing here does I/O.

use std::collections::HashMap;

use super::rules::{Rule, first_violation};
use super::types::{
    PortOutRequest, ReasonCode, SubscriberRecord, ValidationConfig, VerificationOutcome,
};

/// Inputs visible to the per-number record rules.
pub struct RecordContext<'a> {
    pub request: &'a PortOutRequest,
    pub record: &'a SubscriberRecord,
    pub config: &'a ValidationConfig,
}

/// Record rules in evaluation order. The "no record" case is checked first,
/// before any of these run.
pub fn record_rules<'a>() -> [Rule<RecordContext<'a>>; 5] {
    [
        Rule::new(
            "account_number_matches",
            ReasonCode::UnknownAccountNumber,
            account_number_differs,
        ),
        Rule::new("pin_matches", ReasonCode::UnknownPin, pin_differs),
        Rule::new(
            "zip_code_matches",
            ReasonCode::UnknownZipCode,
            zip_code_differs,
        ),
        Rule::new(
            "status_is_active",
            ReasonCode::InactiveStatus,
            status_inactive,
        ),
        Rule::new(
            "subscriber_name_matches",
            ReasonCode::UnknownSubscriberName,
            subscriber_name_differs,
        ),
    ]
}

fn differs(stored: &str, submitted: &Option<String>) -> bool {
    submitted.as_deref() != Some(stored)
}

fn account_number_differs(ctx: &RecordContext<'_>) -> bool {
    ctx.config.verify_account_number
        && differs(&ctx.record.account_number, &ctx.request.account_number)
}

fn pin_differs(ctx: &RecordContext<'_>) -> bool {
    ctx.config.verify_pin && differs(&ctx.record.pin, &ctx.request.pin)
}

fn zip_code_differs(ctx: &RecordContext<'_>) -> bool {
    ctx.config.verify_zip_code && differs(&ctx.record.zip_code, &ctx.request.zip_code)
}

fn status_inactive(ctx: &RecordContext<'_>) -> bool {
    ctx.config.verify_status && ctx.record.status != 1
}

fn subscriber_name_differs(ctx: &RecordContext<'_>) -> bool {
    ctx.config.verify_subscriber_name
        && differs(&ctx.record.subscriber_name, &ctx.request.subscriber_name)
}

/// Key a lookup result by telephone number. When the store returns the same
/// number twice, the first record wins.
pub fn index_records(records: Vec<SubscriberRecord>) -> HashMap<String, SubscriberRecord> {
    let mut by_number = HashMap::with_capacity(records.len());
    for record in records {
        by_number
            .entry(record.telephone_number.clone())
            .or_insert(record);
    }
    by_number
}

/// Decide a request that already passed the Request Validator.
pub fn adjudicate(
    request: &PortOutRequest,
    records_by_number: &HashMap<String, SubscriberRecord>,
    config: &ValidationConfig,
) -> VerificationOutcome {
    let rules = record_rules();

    for entry in &request.telephone_numbers {
        let Some(record) = records_by_number.get(entry.value()) else {
            return VerificationOutcome::Fail(ReasonCode::UnknownTelephoneNumber);
        };

        let ctx = RecordContext {
            request,
            record,
            config,
        };
        if let Some(reason) = first_violation(&rules, &ctx) {
            return VerificationOutcome::Fail(reason);
        }
    }

    VerificationOutcome::Pass
}
