//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every resource (orders, products, users, …) implements
//! to be managed by the generic [`ResourceActor`](crate::ResourceActor). It fixes the associated
//! types for ids, DTOs, actions, context and errors, and provides the lifecycle hooks
//! (`on_create`, `on_update`, `handle_action`).
//!
//! # Id Minting
//! Ids are minted on the *client* side with [`ActorEntity::mint_id`] before the create request is
//! sent. The client needs the id up front to pick the shard that will own the entity, so the
//! actor never allocates ids itself.
//!
//! # Provided Methods (Hooks)
//! [`ActorEntity::on_create`] has a default implementation that does nothing (`Ok(())`).

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by ResourceActor.
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks (e.g., calling other actors).
/// It also defines a `Context` type, which is injected into every hook. This allows "Late Binding"
/// of dependencies (passing clients to `run()` instead of `new()`).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity. Hashed to select the owning shard.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to create a new instance (DTO - Data Transfer Object).
    type Create: Send + Sync + Debug;

    /// The data required to update an existing instance.
    type Update: Send + Sync + Debug;

    /// Enum representing resource-specific operations (e.g., `ReserveStock`).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed. Sharded actors receive one clone per shard.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: clients match on a single error type and
    /// the framework boxes it into [`FrameworkError::EntityError`](crate::FrameworkError::EntityError).
    /// Use [`FrameworkError::entity_error`](crate::FrameworkError::entity_error) to get it back.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Mint a fresh, globally unique id for a new instance.
    fn mint_id() -> Self::Id;

    /// Construct the full Entity from the ID and Payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the entity is constructed and before it is stored.
    /// An error here discards the entity; nothing is inserted.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    // --- Action Handler (Async) ---

    /// Handle a custom resource-specific action.
    ///
    /// The actor processes one request at a time per shard, so no other request for this entity
    /// can observe it while the handler is awaiting.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
