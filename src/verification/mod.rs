//! Port-out decision engine.
//!
//! Two pure stages, run in order by the service:
//! 1. `request::validate()`: fields present, batch size, number format
//! 2. `adjudicator::adjudicate()`: each number against its stored record
//!
//! The caller does the single record lookup between the two stages.

pub mod adjudicator;
pub mod request;
pub mod rules;
pub mod types;

pub use adjudicator::{adjudicate, index_records};
pub use request::validate;
pub use types::{
    PortOutRequest, ReasonCode, SubscriberRecord, TelephoneNumberEntry, ValidationConfig,
    VerificationOutcome,
};
