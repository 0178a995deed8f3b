//! Port-out validation: decides whether telephone numbers may be ported
//! away, answering a losing-carrier XML request with an XML verdict.

pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod service;
pub mod store;
pub mod verification;
pub mod wire;

pub use error::{Error, Result};
