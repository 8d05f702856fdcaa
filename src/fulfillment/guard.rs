//! Declarative guard table.
//!
//! One [`Rule`] per [`TransitionKind`]: which roles may ask, which party of the order the
//! caller must be, and which statuses the transition may start from. [`check`] consults it
//! once per transition, in a fixed order: role, identity, courier slot, status.

use crate::model::{Caller, Order, OrderStatus, Role};
use crate::order_actor::OrderError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Confirm,
    AssignCourier,
    Accept,
    ScanPickup,
    StartTransit,
    ConfirmDelivery,
    Cancel,
    OpenDispute,
    RecordPayment,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 9] = [
        TransitionKind::Confirm,
        TransitionKind::AssignCourier,
        TransitionKind::Accept,
        TransitionKind::ScanPickup,
        TransitionKind::StartTransit,
        TransitionKind::ConfirmDelivery,
        TransitionKind::Cancel,
        TransitionKind::OpenDispute,
        TransitionKind::RecordPayment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Confirm => "confirm",
            TransitionKind::AssignCourier => "assign courier to",
            TransitionKind::Accept => "accept",
            TransitionKind::ScanPickup => "scan pickup for",
            TransitionKind::StartTransit => "start transit for",
            TransitionKind::ConfirmDelivery => "confirm delivery of",
            TransitionKind::Cancel => "cancel",
            TransitionKind::OpenDispute => "dispute",
            TransitionKind::RecordPayment => "record payment for",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which party of the order the caller must be. Admins satisfy every requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// No identity requirement beyond the role.
    Any,
    Seller,
    BuyerOrSeller,
    AssignedCourier,
}

impl Party {
    fn admits(&self, order: &Order, caller: &Caller) -> bool {
        if caller.is_admin() {
            return true;
        }
        let me = caller.user_id;
        match self {
            Party::Any => true,
            Party::Seller => order.seller_id == me,
            Party::BuyerOrSeller => order.buyer_id == me || order.seller_id == me,
            Party::AssignedCourier => order.is_assigned_to(me),
        }
    }
}

#[derive(Debug)]
pub struct Rule {
    pub roles: &'static [Role],
    pub party: Party,
    pub from: &'static [OrderStatus],
    /// The courier slot must still be empty.
    pub unassigned: bool,
}

use OrderStatus::*;

const OPEN: &[OrderStatus] = &[Pending, Confirmed, PickedUp, InTransit, Disputed];

const CONFIRM: Rule = Rule {
    roles: &[Role::Seller, Role::Admin],
    party: Party::Seller,
    from: &[Pending],
    unassigned: false,
};
const ASSIGN_COURIER: Rule = Rule {
    roles: &[Role::Seller, Role::Admin],
    party: Party::Seller,
    from: &[Confirmed],
    unassigned: true,
};
const ACCEPT: Rule = Rule {
    roles: &[Role::Courier],
    party: Party::Any,
    from: &[Confirmed],
    unassigned: true,
};
const SCAN_PICKUP: Rule = Rule {
    roles: &[Role::Courier],
    party: Party::AssignedCourier,
    from: &[Confirmed],
    unassigned: false,
};
const START_TRANSIT: Rule = Rule {
    roles: &[Role::Courier],
    party: Party::AssignedCourier,
    from: &[PickedUp],
    unassigned: false,
};
const CONFIRM_DELIVERY: Rule = Rule {
    roles: &[Role::Courier],
    party: Party::AssignedCourier,
    from: &[PickedUp, InTransit],
    unassigned: false,
};
const CANCEL: Rule = Rule {
    roles: &[Role::Buyer, Role::Seller, Role::Admin],
    party: Party::BuyerOrSeller,
    from: OPEN,
    unassigned: false,
};
const OPEN_DISPUTE: Rule = Rule {
    roles: &[Role::Buyer, Role::Seller, Role::Admin],
    party: Party::BuyerOrSeller,
    from: &[Confirmed, PickedUp, InTransit],
    unassigned: false,
};
const RECORD_PAYMENT: Rule = Rule {
    roles: &[Role::Admin],
    party: Party::Any,
    from: OPEN,
    unassigned: false,
};

pub fn rule(kind: TransitionKind) -> &'static Rule {
    match kind {
        TransitionKind::Confirm => &CONFIRM,
        TransitionKind::AssignCourier => &ASSIGN_COURIER,
        TransitionKind::Accept => &ACCEPT,
        TransitionKind::ScanPickup => &SCAN_PICKUP,
        TransitionKind::StartTransit => &START_TRANSIT,
        TransitionKind::ConfirmDelivery => &CONFIRM_DELIVERY,
        TransitionKind::Cancel => &CANCEL,
        TransitionKind::OpenDispute => &OPEN_DISPUTE,
        TransitionKind::RecordPayment => &RECORD_PAYMENT,
    }
}

/// Role-only check, usable before the order has been loaded.
pub fn authorize_role(kind: TransitionKind, role: Role) -> Result<(), OrderError> {
    if rule(kind).roles.contains(&role) {
        Ok(())
    } else {
        Err(OrderError::Forbidden(format!("a {role} cannot {kind} an order")))
    }
}

pub fn check(kind: TransitionKind, order: &Order, caller: &Caller) -> Result<(), OrderError> {
    let rule = rule(kind);
    authorize_role(kind, caller.role)?;
    if !rule.party.admits(order, caller) {
        return Err(OrderError::Forbidden(format!(
            "user {} cannot {kind} order {}",
            caller.user_id, order.order_number
        )));
    }
    if rule.unassigned {
        if let Some(courier) = order.courier_id {
            return Err(OrderError::Conflict(format!(
                "order {} is no longer available: courier {courier} already assigned",
                order.order_number
            )));
        }
    }
    if !rule.from.contains(&order.status) {
        return Err(OrderError::InvalidState {
            action: kind.as_str(),
            state: order.status.to_string(),
        });
    }
    Ok(())
}
