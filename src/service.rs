//! Port-out service. One request body in, one verdict out.
//!
//! Flow:
//! 1. Decode the XML body
//! 2. Validate the request on its own
//! 3. Look up every telephone number in one store call
//! 4. Adjudicate each number against its record
//!
//! Every failure along the way becomes a 7598 verdict; nothing is raised to
//! the transport.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::store::RecordStore;
use crate::verification::{
    PortOutRequest, ReasonCode, ValidationConfig, VerificationOutcome, adjudicate, index_records,
    validate,
};
use crate::wire::decode_request_bytes;

/// Decides port-out requests against a record store.
#[derive(Clone)]
pub struct PortOutService {
    config: Arc<ValidationConfig>,
    store: Arc<dyn RecordStore>,
}

impl PortOutService {
    pub fn new(config: ValidationConfig, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Decide a raw request body.
    pub async fn verify_body(&self, body: &[u8]) -> VerificationOutcome {
        debug!(body = %String::from_utf8_lossy(body), "Port-out request body");

        let outcome = match self.try_verify_body(body).await {
            Ok(outcome) => outcome,
            Err(Error::Decode(e)) => {
                warn!(error = %e, "Undecodable port-out request");
                VerificationOutcome::Fail(ReasonCode::InvalidRequest)
            }
            Err(e) => {
                error!(error = %e, "Port-out verification failed");
                VerificationOutcome::Fail(ReasonCode::UnexpectedError)
            }
        };

        log_outcome(&outcome);
        outcome
    }

    async fn try_verify_body(&self, body: &[u8]) -> Result<VerificationOutcome, Error> {
        let request = decode_request_bytes(body)?;
        self.verify(request.as_ref()).await
    }

    /// Decide an already decoded request. `None` means the body carried no
    /// usable request element.
    ///
    /// The store is consulted only after the request itself passes, and
    /// then exactly once.
    pub async fn verify(
        &self,
        request: Option<&PortOutRequest>,
    ) -> Result<VerificationOutcome, Error> {
        let outcome = validate(request, &self.config);
        let (VerificationOutcome::Pass, Some(request)) = (outcome, request) else {
            return Ok(outcome);
        };

        let numbers = request.telephone_number_values();
        let records = self.store.find_by_telephone_numbers(&numbers).await?;
        debug!(
            requested = numbers.len(),
            found = records.len(),
            "Records loaded for adjudication"
        );

        Ok(adjudicate(request, &index_records(records), &self.config))
    }
}

fn log_outcome(outcome: &VerificationOutcome) {
    match outcome.reason() {
        Some(reason) => info!(
            code = reason.code(),
            reason = reason.description(),
            "Port-out request refused"
        ),
        None => info!("Port-out request accepted"),
    }
}
