//! # Fulfillment Service
//!
//! The façade the request layer calls. Each method takes the authenticated [`Caller`],
//! resolves what the order store cannot (product price, courier role), sends one command to
//! the store and maps the result to a [`FulfillmentError`].
//!
//! Notifications from a committed transition are handed to the [`Dispatcher`] after the
//! commit; their fate never affects the result returned here.

use super::guard::{self, TransitionKind};
use super::query::{OrderQuery, Page, Paged};
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::FulfillmentConfig;
use crate::error::FulfillmentError;
use crate::model::{
    order_number, Caller, Order, OrderAmounts, OrderId, OrderStatus, PlaceOrder, Role, UserId,
};
use crate::notify::Dispatcher;
use crate::order_actor::{OrderCommand, OrderDraft, OrderRecord, PaymentOutcome};
use actor_framework::{ActorClient, Filter};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct FulfillmentService {
    users: UserClient,
    catalog: ProductClient,
    orders: OrderClient,
    dispatcher: Dispatcher,
    config: Arc<FulfillmentConfig>,
}

impl FulfillmentService {
    pub fn new(
        users: UserClient,
        catalog: ProductClient,
        orders: OrderClient,
        dispatcher: Dispatcher,
        config: Arc<FulfillmentConfig>,
    ) -> Self {
        Self {
            users,
            catalog,
            orders,
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &FulfillmentConfig {
        &self.config
    }

    /// Notification sends that have failed so far.
    pub fn notification_failures(&self) -> u64 {
        self.dispatcher.failures()
    }

    /// Opens a `pending` order for the calling buyer and reserves its stock.
    #[instrument(
        skip(self, request),
        fields(buyer = %caller.user_id, product = %request.product_id)
    )]
    pub async fn place_order(
        &self,
        caller: Caller,
        request: PlaceOrder,
    ) -> Result<OrderRecord, FulfillmentError> {
        if caller.role != Role::Buyer {
            return Err(FulfillmentError::Forbidden(format!(
                "a {} cannot place orders",
                caller.role
            )));
        }
        if request.quantity == 0 {
            return Err(FulfillmentError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }

        let product = self.catalog.require(request.product_id).await?;
        if !product.is_active {
            return Err(FulfillmentError::NotFound(format!(
                "product {} is unavailable",
                product.id
            )));
        }
        // Early answer only; the reservation in the order store is what counts.
        if product.stock < request.quantity {
            return Err(FulfillmentError::InsufficientStock {
                requested: request.quantity,
                available: product.stock,
            });
        }

        let amounts = OrderAmounts::compute(
            product.price,
            request.quantity,
            self.config.courier_fee,
            self.config.commission_rate,
        )
        .ok_or_else(|| {
            FulfillmentError::InvalidRequest(format!(
                "order total for {} x {} is out of range",
                request.quantity, product.id
            ))
        })?;

        let now = Utc::now();
        let draft = OrderDraft {
            order_number: order_number(&self.config.order_number_prefix, now),
            buyer_id: caller.user_id,
            seller_id: product.seller_id,
            product_id: product.id,
            video_id: request.video_id,
            amounts,
            currency: self.config.currency.clone(),
            payment_method: request.payment_method,
            shipping: request.shipping,
            buyer_note: request.buyer_note,
            placed_at: now,
        };

        let id = self.orders.create_order(draft).await.map_err(|e| {
            let e = FulfillmentError::from(e);
            warn!(code = e.kind().code(), error = %e, "Order rejected");
            e
        })?;
        let record = self.orders.require(id).await?;
        info!(
            order_id = %id,
            order_number = %record.order.order_number,
            total = %record.order.amounts.total_amount,
            "Order placed"
        );
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn confirm(
        &self,
        caller: Caller,
        id: OrderId,
    ) -> Result<OrderRecord, FulfillmentError> {
        self.transition(id, caller, OrderCommand::Confirm).await
    }

    /// Hands a confirmed order to a courier. A target that is missing or holds another role
    /// is reported as a missing courier.
    #[instrument(skip(self))]
    pub async fn assign_courier(
        &self,
        caller: Caller,
        id: OrderId,
        courier_id: UserId,
    ) -> Result<OrderRecord, FulfillmentError> {
        guard::authorize_role(TransitionKind::AssignCourier, caller.role)?;
        let courier = self.users.require(courier_id).await?;
        if courier.role != Role::Courier {
            return Err(FulfillmentError::NotFound(format!("courier {courier_id}")));
        }
        self.transition(id, caller, OrderCommand::AssignCourier { courier_id })
            .await
    }

    /// The calling courier takes an unassigned order.
    #[instrument(skip(self))]
    pub async fn accept(
        &self,
        caller: Caller,
        id: OrderId,
    ) -> Result<OrderRecord, FulfillmentError> {
        self.transition(id, caller, OrderCommand::Accept).await
    }

    #[instrument(skip(self, qr_data))]
    pub async fn scan_pickup(
        &self,
        caller: Caller,
        id: OrderId,
        qr_data: &str,
    ) -> Result<OrderRecord, FulfillmentError> {
        let command = OrderCommand::ScanPickup {
            token: qr_data.to_string(),
        };
        self.transition(id, caller, command).await
    }

    #[instrument(skip(self))]
    pub async fn start_transit(
        &self,
        caller: Caller,
        id: OrderId,
    ) -> Result<OrderRecord, FulfillmentError> {
        self.transition(id, caller, OrderCommand::StartTransit).await
    }

    /// Completes the order on a valid delivery QR or, failing that, the numeric code.
    #[instrument(skip(self, qr_data, delivery_code))]
    pub async fn confirm_delivery(
        &self,
        caller: Caller,
        id: OrderId,
        qr_data: Option<String>,
        delivery_code: Option<String>,
    ) -> Result<OrderRecord, FulfillmentError> {
        let command = OrderCommand::ConfirmDelivery {
            token: qr_data,
            code: delivery_code,
        };
        self.transition(id, caller, command).await
    }

    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        caller: Caller,
        id: OrderId,
        reason: Option<String>,
    ) -> Result<OrderRecord, FulfillmentError> {
        self.transition(id, caller, OrderCommand::Cancel { reason })
            .await
    }

    #[instrument(skip(self))]
    pub async fn open_dispute(
        &self,
        caller: Caller,
        id: OrderId,
        reason: String,
    ) -> Result<OrderRecord, FulfillmentError> {
        self.transition(id, caller, OrderCommand::OpenDispute { reason })
            .await
    }

    /// Records what the payment gateway reported. Admin only.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        caller: Caller,
        id: OrderId,
        outcome: PaymentOutcome,
        reference_id: String,
    ) -> Result<OrderRecord, FulfillmentError> {
        let command = OrderCommand::RecordPayment {
            outcome,
            reference_id,
        };
        self.transition(id, caller, command).await
    }

    /// One order with its full transaction history. Parties and admins only.
    #[instrument(skip(self))]
    pub async fn order_details(
        &self,
        caller: Caller,
        id: OrderId,
    ) -> Result<OrderRecord, FulfillmentError> {
        let record = self.orders.require(id).await?;
        if !caller.is_admin() && !record.order.is_party(caller.user_id) {
            return Err(FulfillmentError::Forbidden(format!(
                "user {} is not a party to order {}",
                caller.user_id, record.order.order_number
            )));
        }
        Ok(record)
    }

    /// Orders visible to the caller, newest first.
    ///
    /// Buyers see their purchases, sellers their sales, couriers their deliveries, admins all.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        caller: Caller,
        query: OrderQuery,
    ) -> Result<Paged<Order>, FulfillmentError> {
        let me = caller.user_id;
        let status = query.status;
        let filter = Filter::new(move |record: &OrderRecord| {
            let order = &record.order;
            let visible = match caller.role {
                Role::Buyer => order.buyer_id == me,
                Role::Seller => order.seller_id == me,
                Role::Courier => order.courier_id == Some(me),
                Role::Admin => true,
            };
            visible && status.map_or(true, |s| order.status == s)
        });

        let mut orders: Vec<Order> = self
            .orders
            .list(filter)
            .await?
            .into_iter()
            .map(|record| record.order)
            .collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        Ok(Paged::slice(orders, query.page))
    }

    /// Confirmed orders still waiting for a courier, oldest first. Couriers only.
    #[instrument(skip(self))]
    pub async fn available_orders(
        &self,
        caller: Caller,
        city: Option<String>,
        page: Page,
    ) -> Result<Paged<Order>, FulfillmentError> {
        if caller.role != Role::Courier {
            return Err(FulfillmentError::Forbidden(format!(
                "a {} cannot browse available orders",
                caller.role
            )));
        }
        let city = city
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());
        let filter = Filter::new(move |record: &OrderRecord| {
            let order = &record.order;
            order.status == OrderStatus::Confirmed
                && order.courier_id.is_none()
                && city
                    .as_ref()
                    .map_or(true, |c| order.shipping.city.trim().to_lowercase() == *c)
        });

        let mut orders: Vec<Order> = self
            .orders
            .list(filter)
            .await?
            .into_iter()
            .map(|record| record.order)
            .collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        Ok(Paged::slice(orders, page))
    }

    async fn transition(
        &self,
        id: OrderId,
        caller: Caller,
        command: OrderCommand,
    ) -> Result<OrderRecord, FulfillmentError> {
        let kind = command.kind();
        match self.orders.transition(id, caller, command).await {
            Ok(outcome) => {
                let order = &outcome.record.order;
                info!(
                    order_id = %id,
                    order_number = %order.order_number,
                    transition = ?kind,
                    status = %order.status,
                    "Transition applied"
                );
                self.dispatcher.dispatch(outcome.notifications);
                Ok(outcome.record)
            }
            Err(e) => {
                let e = FulfillmentError::from(e);
                if e.kind().is_caller_error() {
                    warn!(
                        order_id = %id,
                        transition = ?kind,
                        code = e.kind().code(),
                        error = %e,
                        "Transition rejected"
                    );
                }
                Err(e)
            }
        }
    }
}
