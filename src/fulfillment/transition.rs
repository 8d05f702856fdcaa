//! Pure transition planner.
//!
//! [`plan`] turns `(order, caller, command, now)` into the next order value plus the list of
//! side effects the store must apply with it. It never touches the store, the catalog or the
//! clock, so every verdict can be reproduced from its inputs.

use super::guard;
use crate::config::FulfillmentConfig;
use crate::model::{
    Caller, Cancellation, Dispute, NewTransaction, Order, OrderStatus, PaymentStatus, ProductId,
    TransactionType, UserId,
};
use crate::notify::Notification;
use crate::order_actor::{OrderCommand, OrderError, PaymentOutcome};
use crate::proof::{ProofService, ProofStep};
use chrono::{DateTime, Utc};
use tracing::debug;

/// A side effect of a transition, applied by the order store in the same turn as the status
/// change.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    IssueProof(ProofStep),
    /// Generates the numeric delivery code and texts it to the shipping phone.
    IssueDeliveryCode,
    AppendLedger(NewTransaction),
    RestoreStock {
        product_id: ProductId,
        quantity: u32,
    },
    Notify(Notification),
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub next: Order,
    pub effects: Vec<Effect>,
}

/// Settings the planner reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    pub strict_delivery_proof: bool,
}

impl From<&FulfillmentConfig> for Policy {
    fn from(config: &FulfillmentConfig) -> Self {
        Self {
            strict_delivery_proof: config.strict_delivery_proof,
        }
    }
}

pub fn plan(
    order: &Order,
    caller: &Caller,
    command: OrderCommand,
    proofs: &ProofService,
    policy: &Policy,
    now: DateTime<Utc>,
) -> Result<Plan, OrderError> {
    let kind = command.kind();
    guard::check(kind, order, caller)?;

    let mut next = order.clone();
    next.updated_at = now;
    let mut effects = Vec::new();

    match command {
        OrderCommand::Confirm => {
            next.status = OrderStatus::Confirmed;
            next.confirmed_at = Some(now);
        }
        OrderCommand::AssignCourier { courier_id } => {
            assign(&mut next, courier_id, &mut effects);
        }
        OrderCommand::Accept => {
            assign(&mut next, caller.user_id, &mut effects);
        }
        OrderCommand::ScanPickup { token } => {
            proofs
                .verify(
                    &token,
                    order.pickup_proof.as_ref(),
                    order.id,
                    ProofStep::SellerPickup,
                    now,
                )
                .map_err(|e| OrderError::InvalidProof(e.to_string()))?;
            next.status = OrderStatus::PickedUp;
            next.picked_up_at = Some(now);
        }
        OrderCommand::StartTransit => {
            next.status = OrderStatus::InTransit;
            next.in_transit_at = Some(now);
        }
        OrderCommand::ConfirmDelivery { token, code } => {
            verify_delivery(order, token.as_deref(), code.as_deref(), proofs, policy, now)?;
            next.status = OrderStatus::Delivered;
            next.delivered_at = Some(now);
            next.payment_status = PaymentStatus::Completed;
            effects.extend(settlement(order).into_iter().map(Effect::AppendLedger));
        }
        OrderCommand::Cancel { reason } => {
            next.status = OrderStatus::Cancelled;
            next.payment_status = PaymentStatus::Refunded;
            next.cancellation = Some(Cancellation {
                by: caller.user_id,
                reason: reason.filter(|r| !r.trim().is_empty()),
                at: now,
            });
            effects.push(Effect::RestoreStock {
                product_id: order.product_id,
                quantity: order.quantity(),
            });
            effects.push(Effect::AppendLedger(
                NewTransaction::new(
                    order.id,
                    TransactionType::Refund,
                    order.amounts.total_amount,
                    order.currency.clone(),
                    PaymentStatus::Completed,
                    format!("Refund for cancelled order {}", order.order_number),
                )
                .for_user(order.buyer_id),
            ));
        }
        OrderCommand::OpenDispute { reason } => {
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(OrderError::InvalidRequest(
                    "a dispute needs a reason".to_string(),
                ));
            }
            next.status = OrderStatus::Disputed;
            next.dispute = Some(Dispute {
                by: caller.user_id,
                reason: reason.to_string(),
                at: now,
            });
        }
        OrderCommand::RecordPayment {
            outcome,
            reference_id,
        } => {
            if order.payment_status != PaymentStatus::Pending {
                return Err(OrderError::InvalidState {
                    action: kind.as_str(),
                    state: format!("payment {}", order.payment_status),
                });
            }
            let reference_id = reference_id.trim();
            if reference_id.is_empty() {
                return Err(OrderError::InvalidRequest(
                    "a payment reference id is required".to_string(),
                ));
            }
            let entry = match outcome {
                PaymentOutcome::Captured => {
                    next.payment_status = PaymentStatus::Held;
                    NewTransaction::new(
                        order.id,
                        TransactionType::EscrowHold,
                        order.amounts.total_amount,
                        order.currency.clone(),
                        PaymentStatus::Held,
                        format!("Escrow hold for order {}", order.order_number),
                    )
                }
                PaymentOutcome::Failed => {
                    next.payment_status = PaymentStatus::Failed;
                    NewTransaction::new(
                        order.id,
                        TransactionType::Payment,
                        order.amounts.total_amount,
                        order.currency.clone(),
                        PaymentStatus::Failed,
                        format!("Payment failed for order {}", order.order_number),
                    )
                }
            };
            effects.push(Effect::AppendLedger(
                entry
                    .for_user(order.buyer_id)
                    .with_reference(reference_id),
            ));
        }
    }

    debug!(
        order_id = %order.id,
        transition = ?kind,
        from = %order.status,
        to = %next.status,
        effects = effects.len(),
        "Planned transition"
    );
    Ok(Plan { next, effects })
}

fn assign(next: &mut Order, courier_id: UserId, effects: &mut Vec<Effect>) {
    next.courier_id = Some(courier_id);
    effects.push(Effect::IssueProof(ProofStep::CourierDelivery));
    effects.push(Effect::IssueDeliveryCode);
    effects.push(Effect::Notify(Notification::CourierAssigned {
        courier_id,
        order_number: next.order_number.clone(),
    }));
}

/// QR first, numeric code second. In strict mode a presented QR that fails is final.
fn verify_delivery(
    order: &Order,
    token: Option<&str>,
    code: Option<&str>,
    proofs: &ProofService,
    policy: &Policy,
    now: DateTime<Utc>,
) -> Result<(), OrderError> {
    let token = token.map(str::trim).filter(|t| !t.is_empty());
    let code = code.map(str::trim).filter(|c| !c.is_empty());

    if let Some(token) = token {
        match proofs.verify(
            token,
            order.delivery_proof.as_ref(),
            order.id,
            ProofStep::CourierDelivery,
            now,
        ) {
            Ok(_) => return Ok(()),
            Err(e) if policy.strict_delivery_proof || code.is_none() => {
                return Err(OrderError::InvalidProof(e.to_string()));
            }
            Err(e) => {
                debug!(order_id = %order.id, error = %e, "Delivery proof rejected, trying code");
            }
        }
    }

    match (code, order.delivery_code.as_deref()) {
        (Some(given), Some(expected)) if given == expected => Ok(()),
        (Some(_), _) => Err(OrderError::InvalidProof(
            "delivery code does not match".to_string(),
        )),
        (None, _) => Err(OrderError::InvalidProof(
            "a delivery proof or code is required".to_string(),
        )),
    }
}

/// The three delivery entries. Amounts are copied from the order's snapshot.
fn settlement(order: &Order) -> [NewTransaction; 3] {
    let amounts = &order.amounts;
    let number = &order.order_number;
    let mut courier_payout = NewTransaction::new(
        order.id,
        TransactionType::CourierPayout,
        amounts.courier_fee,
        order.currency.clone(),
        PaymentStatus::Completed,
        format!("Courier fee for order {number}"),
    );
    if let Some(courier) = order.courier_id {
        courier_payout = courier_payout.for_user(courier);
    }
    [
        NewTransaction::new(
            order.id,
            TransactionType::SellerPayout,
            amounts.seller_amount,
            order.currency.clone(),
            PaymentStatus::Completed,
            format!("Seller payout for order {number}"),
        )
        .for_user(order.seller_id),
        courier_payout,
        NewTransaction::new(
            order.id,
            TransactionType::PlatformCommission,
            amounts.platform_commission,
            order.currency.clone(),
            PaymentStatus::Completed,
            format!("Platform commission for order {number}"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::guard::tests::order_at;
    use crate::model::Role;
    use chrono::Duration;
    use rust_decimal::Decimal;

    fn proofs() -> ProofService {
        ProofService::new(b"planner-secret", Duration::hours(24)).unwrap()
    }

    fn assigned_at(status: OrderStatus, proofs: &ProofService) -> (Order, Caller) {
        let mut order = order_at(status);
        let courier = UserId::new();
        order.courier_id = Some(courier);
        order.pickup_proof = Some(proofs.issue(order.id, ProofStep::SellerPickup));
        order.delivery_proof = Some(proofs.issue(order.id, ProofStep::CourierDelivery));
        order.delivery_code = Some("482913".to_string());
        (order, Caller::new(courier, Role::Courier))
    }

    fn ledger_entries(effects: &[Effect]) -> Vec<&NewTransaction> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::AppendLedger(entry) => Some(entry),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn confirm_moves_pending_to_confirmed() {
        let order = order_at(OrderStatus::Pending);
        let seller = Caller::new(order.seller_id, Role::Seller);
        let now = Utc::now();
        let plan = plan(
            &order,
            &seller,
            OrderCommand::Confirm,
            &proofs(),
            &Policy::default(),
            now,
        )
        .unwrap();
        assert_eq!(plan.next.status, OrderStatus::Confirmed);
        assert_eq!(plan.next.confirmed_at, Some(now));
        assert!(plan.effects.is_empty());
    }

    #[test]
    fn accept_sets_courier_and_issues_delivery_artifacts() {
        let order = order_at(OrderStatus::Confirmed);
        let courier = Caller::new(UserId::new(), Role::Courier);
        let plan = plan(
            &order,
            &courier,
            OrderCommand::Accept,
            &proofs(),
            &Policy::default(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan.next.courier_id, Some(courier.user_id));
        assert_eq!(plan.next.status, OrderStatus::Confirmed);
        assert_eq!(
            plan.effects[..2],
            [
                Effect::IssueProof(ProofStep::CourierDelivery),
                Effect::IssueDeliveryCode
            ]
        );
        match &plan.effects[2] {
            Effect::Notify(Notification::CourierAssigned { courier_id, .. }) => {
                assert_eq!(*courier_id, courier.user_id)
            }
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn scan_pickup_with_stored_proof_picks_up() {
        let proofs = proofs();
        let (order, courier) = assigned_at(OrderStatus::Confirmed, &proofs);
        let token = order.pickup_proof.clone().unwrap().token;
        let plan = plan(
            &order,
            &courier,
            OrderCommand::ScanPickup { token },
            &proofs,
            &Policy::default(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan.next.status, OrderStatus::PickedUp);
        assert!(plan.next.picked_up_at.is_some());
    }

    #[test]
    fn scan_pickup_with_other_orders_proof_is_invalid_proof() {
        let proofs = proofs();
        let (order, courier) = assigned_at(OrderStatus::Confirmed, &proofs);
        let foreign = proofs.issue(crate::model::OrderId::new(), ProofStep::SellerPickup);
        let result = plan(
            &order,
            &courier,
            OrderCommand::ScanPickup {
                token: foreign.token,
            },
            &proofs,
            &Policy::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(OrderError::InvalidProof(_))));
    }

    #[test]
    fn delivery_by_code_appends_balanced_settlement() {
        let proofs = proofs();
        let (order, courier) = assigned_at(OrderStatus::InTransit, &proofs);
        let plan = plan(
            &order,
            &courier,
            OrderCommand::ConfirmDelivery {
                token: None,
                code: Some("482913".to_string()),
            },
            &proofs,
            &Policy::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.next.status, OrderStatus::Delivered);
        assert_eq!(plan.next.payment_status, PaymentStatus::Completed);
        let entries = ledger_entries(&plan.effects);
        assert_eq!(entries.len(), 3);
        let paid: Decimal = entries.iter().map(|e| e.amount).sum();
        assert_eq!(paid, order.amounts.settlement_total());
        assert_eq!(entries[0].user_id, Some(order.seller_id));
        assert_eq!(entries[1].user_id, order.courier_id);
        assert_eq!(entries[2].user_id, None);
    }

    #[test]
    fn bad_qr_falls_back_to_code_unless_strict() {
        let proofs = proofs();
        let (order, courier) = assigned_at(OrderStatus::PickedUp, &proofs);
        let command = OrderCommand::ConfirmDelivery {
            token: Some("garbage".to_string()),
            code: Some("482913".to_string()),
        };

        let lenient = plan(
            &order,
            &courier,
            command.clone(),
            &proofs,
            &Policy::default(),
            Utc::now(),
        );
        assert!(lenient.is_ok());

        let strict = plan(
            &order,
            &courier,
            command,
            &proofs,
            &Policy {
                strict_delivery_proof: true,
            },
            Utc::now(),
        );
        assert!(matches!(strict, Err(OrderError::InvalidProof(_))));
    }

    #[test]
    fn delivery_without_any_proof_is_rejected() {
        let proofs = proofs();
        let (order, courier) = assigned_at(OrderStatus::PickedUp, &proofs);
        let result = plan(
            &order,
            &courier,
            OrderCommand::ConfirmDelivery {
                token: None,
                code: Some("000000".to_string()),
            },
            &proofs,
            &Policy::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(OrderError::InvalidProof(_))));
    }

    #[test]
    fn cancel_refunds_total_and_restores_stock() {
        let order = order_at(OrderStatus::Confirmed);
        let buyer = Caller::new(order.buyer_id, Role::Buyer);
        let plan = plan(
            &order,
            &buyer,
            OrderCommand::Cancel {
                reason: Some("changed my mind".to_string()),
            },
            &proofs(),
            &Policy::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(plan.next.status, OrderStatus::Cancelled);
        assert_eq!(plan.next.payment_status, PaymentStatus::Refunded);
        assert_eq!(plan.next.cancellation.as_ref().unwrap().by, buyer.user_id);
        assert!(plan.effects.contains(&Effect::RestoreStock {
            product_id: order.product_id,
            quantity: 2
        }));
        let entries = ledger_entries(&plan.effects);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, TransactionType::Refund);
        assert_eq!(entries[0].amount, order.amounts.total_amount);
    }

    #[test]
    fn dispute_requires_a_reason() {
        let order = order_at(OrderStatus::Confirmed);
        let buyer = Caller::new(order.buyer_id, Role::Buyer);
        let result = plan(
            &order,
            &buyer,
            OrderCommand::OpenDispute {
                reason: "  ".to_string(),
            },
            &proofs(),
            &Policy::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(OrderError::InvalidRequest(_))));
    }

    #[test]
    fn captured_payment_is_held_in_escrow_once() {
        let order = order_at(OrderStatus::Pending);
        let admin = Caller::new(UserId::new(), Role::Admin);
        let command = OrderCommand::RecordPayment {
            outcome: PaymentOutcome::Captured,
            reference_id: "payme-771".to_string(),
        };
        let plan1 = plan(
            &order,
            &admin,
            command.clone(),
            &proofs(),
            &Policy::default(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(plan1.next.payment_status, PaymentStatus::Held);
        let entries = ledger_entries(&plan1.effects);
        assert_eq!(entries[0].kind, TransactionType::EscrowHold);
        assert_eq!(entries[0].reference_id.as_deref(), Some("payme-771"));

        let again = plan(
            &plan1.next,
            &admin,
            command,
            &proofs(),
            &Policy::default(),
            Utc::now(),
        );
        assert!(matches!(again, Err(OrderError::InvalidState { .. })));
    }

    #[test]
    fn rejected_plan_leaves_input_untouched() {
        let order = order_at(OrderStatus::Delivered);
        let before = order.clone();
        let buyer = Caller::new(order.buyer_id, Role::Buyer);
        let result = plan(
            &order,
            &buyer,
            OrderCommand::Cancel { reason: None },
            &proofs(),
            &Policy::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(OrderError::InvalidState { .. })));
        assert_eq!(order, before);
    }
}
