//! Caller-facing errors.
//!
//! Every rejection the request layer can see is a [`FulfillmentError`]. Its
//! [`kind`](FulfillmentError::kind) carries the machine-readable reason code; the message is
//! for humans.

use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;
use std::fmt;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    InsufficientStock,
    InvalidProof,
    Conflict,
    InvalidRequest,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InsufficientStock => "insufficient_stock",
            ErrorKind::InvalidProof => "invalid_proof",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Internal => "internal",
        }
    }

    /// Everything except `Internal` is the caller's to fix.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, ErrorKind::Internal)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FulfillmentError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl FulfillmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FulfillmentError::NotFound(_) => ErrorKind::NotFound,
            FulfillmentError::Forbidden(_) => ErrorKind::Forbidden,
            FulfillmentError::InvalidState(_) => ErrorKind::InvalidState,
            FulfillmentError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            FulfillmentError::InvalidProof(_) => ErrorKind::InvalidProof,
            FulfillmentError::Conflict(_) => ErrorKind::Conflict,
            FulfillmentError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            FulfillmentError::Internal(_) => ErrorKind::Internal,
        }
    }

    fn internal(source: impl fmt::Display) -> Self {
        let message = source.to_string();
        error!(error = %message, "Internal failure");
        FulfillmentError::Internal(message)
    }
}

impl From<OrderError> for FulfillmentError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(id) => FulfillmentError::NotFound(format!("order {id}")),
            OrderError::Forbidden(msg) => FulfillmentError::Forbidden(msg),
            OrderError::InvalidState { .. } => FulfillmentError::InvalidState(e.to_string()),
            OrderError::InvalidProof(msg) => FulfillmentError::InvalidProof(msg),
            OrderError::Conflict(msg) => FulfillmentError::Conflict(msg),
            OrderError::InvalidRequest(msg) => FulfillmentError::InvalidRequest(msg),
            OrderError::Catalog(inner) => inner.into(),
            OrderError::Ledger(_) | OrderError::ActorCommunicationError(_) => Self::internal(e),
        }
    }
}

impl From<ProductError> for FulfillmentError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::NotFound(id) => FulfillmentError::NotFound(format!("product {id}")),
            ProductError::Inactive(id) => {
                FulfillmentError::NotFound(format!("product {id} is unavailable"))
            }
            ProductError::InsufficientStock {
                requested,
                available,
            } => FulfillmentError::InsufficientStock {
                requested,
                available,
            },
            ProductError::InvalidQuantity(_) | ProductError::InvalidPrice(_) => {
                FulfillmentError::InvalidRequest(e.to_string())
            }
            ProductError::ActorCommunicationError(_) => Self::internal(e),
        }
    }
}

impl From<UserError> for FulfillmentError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound(id) => FulfillmentError::NotFound(format!("user {id}")),
            UserError::ValidationError(msg) => FulfillmentError::InvalidRequest(msg),
            UserError::ActorCommunicationError(_) => Self::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;
    use crate::model::OrderId;
    use rust_decimal::Decimal;

    #[test]
    fn codes_are_snake_case() {
        assert_eq!(ErrorKind::InsufficientStock.code(), "insufficient_stock");
        assert_eq!(ErrorKind::InvalidProof.to_string(), "invalid_proof");
    }

    #[test]
    fn order_rejections_keep_their_kind() {
        let cases = [
            (OrderError::Forbidden("x".into()), ErrorKind::Forbidden),
            (
                OrderError::InvalidState {
                    action: "cancel",
                    state: "delivered".into(),
                },
                ErrorKind::InvalidState,
            ),
            (OrderError::InvalidProof("x".into()), ErrorKind::InvalidProof),
            (OrderError::Conflict("x".into()), ErrorKind::Conflict),
            (OrderError::NotFound("x".into()), ErrorKind::NotFound),
        ];
        for (order_error, kind) in cases {
            assert_eq!(FulfillmentError::from(order_error).kind(), kind);
        }
    }

    #[test]
    fn catalog_failures_map_through() {
        let e: FulfillmentError = OrderError::Catalog(ProductError::InsufficientStock {
            requested: 3,
            available: 1,
        })
        .into();
        assert_eq!(
            e,
            FulfillmentError::InsufficientStock {
                requested: 3,
                available: 1
            }
        );
        let inactive: FulfillmentError = ProductError::Inactive("p".into()).into();
        assert_eq!(inactive.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn plumbing_failures_are_internal() {
        let ledger = OrderError::Ledger(LedgerError::NegativeAmount(
            Decimal::NEGATIVE_ONE,
            crate::model::TransactionType::Refund,
        ));
        assert_eq!(FulfillmentError::from(ledger).kind(), ErrorKind::Internal);
        let closed = OrderError::ActorCommunicationError(format!("closed {}", OrderId::new()));
        let kind = FulfillmentError::from(closed).kind();
        assert_eq!(kind, ErrorKind::Internal);
        assert!(!kind.is_caller_error());
    }
}
