//! Werkmarkt Payments - the bridge to the external escrow gateway
//!
//! The gateway itself is an external collaborator; this crate owns the
//! trait boundary the lifecycle engine talks through, the webhook event
//! shapes it consumes, and a mock gateway for development and tests.
//!
//! Payment is asynchronous from the caller's perspective: creating a
//! checkout session returns immediately, and the `paid` transition arrives
//! later via webhook, possibly more than once.

mod gateway;
mod mock;

use thiserror::Error;

pub use gateway::{GatewayEvent, PaymentGateway};
pub use mock::MockGateway;

/// Payment bridge failures
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The external gateway rejected or failed the call
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A webhook referenced a session this platform never created
    #[error("Unknown checkout session: {0}")]
    UnknownSession(String),

    /// Malformed request (non-positive amount, currency mismatch, ...)
    #[error("Validation error: {0}")]
    Validation(String),
}
