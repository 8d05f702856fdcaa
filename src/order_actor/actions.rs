//! Custom actions for the Order actor.
//!
//! There is exactly one: [`OrderAction::Transition`]. Every status change, proof issuance and
//! ledger entry after creation goes through it.

use super::entity::OrderRecord;
use crate::fulfillment::TransitionKind;
use crate::model::{Caller, UserId};
use crate::notify::Notification;

/// What the gateway reported for an order's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Captured,
    Failed,
}

/// A requested fulfillment step, with its operation-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderCommand {
    Confirm,
    /// Seller or admin hands the order to `courier_id`. The directory lookup that proves
    /// `courier_id` is a courier happens before the command is sent.
    AssignCourier { courier_id: UserId },
    /// The calling courier takes the order.
    Accept,
    ScanPickup { token: String },
    StartTransit,
    /// Either channel may be supplied; the QR token is tried first.
    ConfirmDelivery {
        token: Option<String>,
        code: Option<String>,
    },
    Cancel { reason: Option<String> },
    OpenDispute { reason: String },
    RecordPayment {
        outcome: PaymentOutcome,
        reference_id: String,
    },
}

impl OrderCommand {
    pub fn kind(&self) -> TransitionKind {
        match self {
            OrderCommand::Confirm => TransitionKind::Confirm,
            OrderCommand::AssignCourier { .. } => TransitionKind::AssignCourier,
            OrderCommand::Accept => TransitionKind::Accept,
            OrderCommand::ScanPickup { .. } => TransitionKind::ScanPickup,
            OrderCommand::StartTransit => TransitionKind::StartTransit,
            OrderCommand::ConfirmDelivery { .. } => TransitionKind::ConfirmDelivery,
            OrderCommand::Cancel { .. } => TransitionKind::Cancel,
            OrderCommand::OpenDispute { .. } => TransitionKind::OpenDispute,
            OrderCommand::RecordPayment { .. } => TransitionKind::RecordPayment,
        }
    }
}

#[derive(Debug, Clone)]
pub enum OrderAction {
    Transition { caller: Caller, command: OrderCommand },
}

/// The committed record plus the notifications the transition produced.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub record: OrderRecord,
    pub notifications: Vec<Notification>,
}
