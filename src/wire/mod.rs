//! XML envelope for requests and verdicts.

pub mod decode;
pub mod encode;

pub use decode::{decode_request, decode_request_bytes};
pub use encode::{FALLBACK_FAILURE_BODY, encode_outcome};
