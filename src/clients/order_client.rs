//! # Order Client
//!
//! Provides a high‑level API for interacting with the sharded `Order` store.
//! It wraps a `ResourceClient<OrderRecord>`; the client routes each call to the shard that
//! owns the order.
use crate::model::{Caller, OrderId};
use crate::order_actor::{
    OrderAction, OrderCommand, OrderDraft, OrderError, OrderRecord, TransitionOutcome,
};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
///
/// Stock reservation and proof issuance happen in the Order actor's `on_create` hook.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<OrderRecord>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<OrderRecord>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, draft), fields(order_number = %draft.order_number))]
    pub async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, OrderError> {
        debug!("Sending create to order store");
        self.inner.create(draft).await.map_err(Self::map_error)
    }

    /// Runs one guarded transition on the shard owning `id`.
    #[instrument(skip(self, command), fields(kind = ?command.kind()))]
    pub async fn transition(
        &self,
        id: OrderId,
        caller: Caller,
        command: OrderCommand,
    ) -> Result<TransitionOutcome, OrderError> {
        debug!("Sending transition");
        self.inner
            .perform_action(id, OrderAction::Transition { caller, command })
            .await
            .map_err(Self::map_error)
    }

    /// Fetches an order, treating absence as [`OrderError::NotFound`].
    #[instrument(skip(self))]
    pub async fn require(&self, id: OrderId) -> Result<OrderRecord, OrderError> {
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl ActorClient<OrderRecord> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<OrderRecord> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        if let Some(err) = e.entity_error::<OrderError>() {
            return err.clone();
        }
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
