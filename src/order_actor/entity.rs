//! [`ActorEntity`] implementation for [`OrderRecord`].
//!
//! # Create
//! `from_create_params` builds the `pending` order from an [`OrderDraft`]. `on_create` then
//! issues the pickup proof for the final id, opens the `payment` entry and reserves stock.
//! The reservation runs last: if it fails, the record is dropped and nothing was taken.
//!
//! # Transition
//! The only mutation after creation. The planner decides; this module applies:
//! 1. ledger entries are admitted (checked, not written),
//! 2. stock restores run against the catalog,
//! 3. proofs, codes and entries are written and the new order replaces the old one.
//!
//! A failure in steps 1 or 2 returns before anything is written.

use super::actions::{OrderAction, TransitionOutcome};
use super::error::OrderError;
use crate::clients::ProductClient;
use crate::fulfillment::transition::{self, Effect, Plan, Policy};
use crate::ledger::Ledger;
use crate::model::{
    NewTransaction, Order, OrderAmounts, OrderId, OrderStatus, PaymentMethod, PaymentStatus,
    ProductId, Shipping, TransactionType, UserId, VideoId,
};
use crate::notify::Notification;
use crate::product_actor::ProductError;
use crate::proof::{generate_delivery_code, ProofService, ProofStep};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{debug, info, warn};

/// The stored entity: an order and its journal, committed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order: Order,
    pub ledger: Ledger,
}

/// Everything needed to open an order. Built by the fulfillment service after it has read
/// the product; the amounts are final.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub order_number: String,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub product_id: ProductId,
    pub video_id: Option<VideoId>,
    pub amounts: OrderAmounts,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub shipping: Shipping,
    pub buyer_note: Option<String>,
    pub placed_at: DateTime<Utc>,
}

/// Dependencies injected into every order shard.
#[derive(Clone)]
pub struct OrderContext {
    pub catalog: ProductClient,
    pub proofs: ProofService,
    pub policy: Policy,
}

fn require(field: &str, value: &str) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for OrderRecord {
    type Id = OrderId;
    type Create = OrderDraft;
    type Update = Infallible;
    type Action = OrderAction;
    type ActionResult = TransitionOutcome;
    type Context = OrderContext;
    type Error = OrderError;

    fn mint_id() -> OrderId {
        OrderId::new()
    }

    fn from_create_params(id: OrderId, draft: OrderDraft) -> Result<Self, Self::Error> {
        if draft.amounts.quantity == 0 {
            return Err(OrderError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        if !draft.amounts.is_balanced() {
            return Err(OrderError::InvalidRequest(format!(
                "order amounts do not balance: {:?}",
                draft.amounts
            )));
        }
        require("shipping address", &draft.shipping.address)?;
        require("shipping city", &draft.shipping.city)?;
        require("shipping phone", &draft.shipping.phone)?;

        let order = Order {
            id,
            order_number: draft.order_number,
            buyer_id: draft.buyer_id,
            seller_id: draft.seller_id,
            courier_id: None,
            product_id: draft.product_id,
            video_id: draft.video_id,
            amounts: draft.amounts,
            currency: draft.currency,
            status: OrderStatus::Pending,
            payment_method: draft.payment_method,
            payment_status: PaymentStatus::Pending,
            shipping: draft.shipping,
            buyer_note: draft.buyer_note,
            pickup_proof: None,
            delivery_proof: None,
            delivery_code: None,
            created_at: draft.placed_at,
            updated_at: draft.placed_at,
            confirmed_at: None,
            picked_up_at: None,
            in_transit_at: None,
            delivered_at: None,
            cancellation: None,
            dispute: None,
        };
        Ok(Self {
            order,
            ledger: Ledger::new(id),
        })
    }

    async fn on_create(&mut self, ctx: &Self::Context) -> Result<(), Self::Error> {
        let order = &mut self.order;
        order.pickup_proof =
            Some(ctx.proofs.issue_at(order.id, ProofStep::SellerPickup, order.created_at));

        let payment = NewTransaction::new(
            order.id,
            TransactionType::Payment,
            order.amounts.total_amount,
            order.currency.clone(),
            PaymentStatus::Pending,
            format!("Payment for order {}", order.order_number),
        )
        .for_user(order.buyer_id);
        self.ledger.append(payment, order.created_at)?;

        let remaining = ctx
            .catalog
            .reserve_stock(order.product_id, order.quantity())
            .await?;
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            product_id = %order.product_id,
            remaining,
            "Stock reserved"
        );
        Ok(())
    }

    async fn on_update(
        &mut self,
        update: Infallible,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        match update {}
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &Self::Context,
    ) -> Result<TransitionOutcome, Self::Error> {
        match action {
            OrderAction::Transition { caller, command } => {
                let now = Utc::now();
                let plan = transition::plan(
                    &self.order,
                    &caller,
                    command,
                    &ctx.proofs,
                    &ctx.policy,
                    now,
                )?;
                self.commit(plan, ctx, now).await
            }
        }
    }
}

impl OrderRecord {
    async fn commit(
        &mut self,
        plan: Plan,
        ctx: &OrderContext,
        now: DateTime<Utc>,
    ) -> Result<TransitionOutcome, OrderError> {
        let Plan { mut next, effects } = plan;

        for effect in &effects {
            if let Effect::AppendLedger(entry) = effect {
                self.ledger.admit(entry)?;
            }
        }

        for effect in &effects {
            if let Effect::RestoreStock {
                product_id,
                quantity,
            } = effect
            {
                match ctx.catalog.restore_stock(*product_id, *quantity).await {
                    Ok(level) => debug!(%product_id, quantity, level, "Stock restored"),
                    // A delisted product has nothing to restore into.
                    Err(ProductError::NotFound(_)) => {
                        warn!(order_id = %next.id, %product_id, "Product gone, stock not restored")
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let mut ledger = self.ledger.clone();
        let mut notifications = Vec::new();
        for effect in effects {
            match effect {
                Effect::IssueProof(step) => {
                    let proof = ctx.proofs.issue_at(next.id, step, now);
                    match step {
                        ProofStep::SellerPickup => next.pickup_proof = Some(proof),
                        ProofStep::CourierDelivery => next.delivery_proof = Some(proof),
                    }
                }
                Effect::IssueDeliveryCode => {
                    let code = generate_delivery_code();
                    notifications.push(Notification::DeliveryCode {
                        phone: next.shipping.phone.clone(),
                        code: code.clone(),
                        order_number: next.order_number.clone(),
                    });
                    next.delivery_code = Some(code);
                }
                Effect::AppendLedger(entry) => {
                    ledger.append(entry, now)?;
                }
                Effect::RestoreStock { .. } => {}
                Effect::Notify(notification) => notifications.push(notification),
            }
        }

        info!(
            order_id = %next.id,
            from = %self.order.status,
            to = %next.status,
            payment = %next.payment_status,
            entries = ledger.len(),
            "Transition committed"
        );
        self.order = next;
        self.ledger = ledger;
        Ok(TransitionOutcome {
            record: self.clone(),
            notifications,
        })
    }
}
