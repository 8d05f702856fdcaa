//! Error types for the Order actor.
//!
//! These are the typed rejections of the order store. They cross the actor channel boxed in
//! `FrameworkError::EntityError` and are recovered intact by
//! [`OrderClient`](crate::clients::OrderClient).

use crate::ledger::LedgerError;
use crate::product_actor::ProductError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The caller's role or identity does not allow the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation is not legal in the order's current state.
    #[error("Cannot {action} order while {state}")]
    InvalidState { action: &'static str, state: String },

    /// A QR proof or delivery code was rejected.
    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    /// Another caller got there first (e.g. the courier slot is taken).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request itself is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The catalog refused or failed a stock change.
    #[error("Catalog error: {0}")]
    Catalog(#[from] ProductError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
