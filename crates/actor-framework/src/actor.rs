//! # Generic Actor Server
//!
//! This module defines the `ResourceActor`, the core component that manages the lifecycle
//! and state of entities. It implements the "Server" side of the Actor Model, processing
//! messages sequentially and ensuring exclusive access to the entity store.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state (`store`) and
/// the receiver end of the channel.
///
/// **Concurrency Model**:
/// Each `ResourceActor` processes its own messages *sequentially* in a loop, so the `store`
/// needs no `Mutex` or `RwLock`. Exclusive ownership of state within the task is the lock.
///
/// # Sharding
/// [`ResourceActor::sharded`] splits one resource type across several actors. The client
/// hashes each id to pick a shard, so every request for a given entity lands on the same
/// actor and is serialized there, while requests for different entities proceed in parallel.
/// [`ResourceActor::new`] is the single-shard case.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `ResourceActor::new()` (or `sharded()`) to get the actor(s) and the client.
/// 2.  **Wire**: Pass dependencies (other clients) into `actor.run(context)`.
/// 3.  **Run**: Spawn each actor's run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// static NEXT: AtomicU32 = AtomicU32::new(1);
///
/// #[derive(Clone, Debug)] struct MyEntity { id: u32 }
/// #[derive(Debug)] struct MyCreate;
/// #[derive(Debug)] struct MyUpdate;
/// #[derive(Debug)] enum MyAction {}
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct MyError(String);
///
/// #[async_trait]
/// impl ActorEntity for MyEntity {
///     type Id = u32;
///     type Create = MyCreate;
///     type Update = MyUpdate;
///     type Action = MyAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = MyError;
///
///     fn mint_id() -> u32 { NEXT.fetch_add(1, Ordering::Relaxed) }
///     fn from_create_params(id: u32, _: MyCreate) -> Result<Self, Self::Error> { Ok(Self { id }) }
///     async fn on_update(&mut self, _: MyUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: MyAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actors, client) = ResourceActor::<MyEntity>::sharded(4, 10);
///     for actor in actors {
///         tokio::spawn(actor.run(()));
///     }
///     let id = client.create(MyCreate).await.unwrap();
///     assert!(client.get(id).await.unwrap().is_some());
/// }
/// ```
///
/// # Operations
///
/// * **Create**: rejects an id already in the store with `DuplicateId`, builds the entity with
///   `from_create_params`, runs `on_create`, and only then inserts it.
/// * **Get**: returns a clone of the entity, or `None`.
/// * **Update**: runs `on_update` against the stored entity and returns the new state.
/// * **List**: returns clones of every entity in this shard matching the filter.
/// * **Action**: runs `handle_action` against the stored entity and returns its result.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    shard: usize,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a single `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the capacity of the MPSC channel. If the channel is full,
    /// calls to the client wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self::with_receiver(receiver, 0);
        (actor, ResourceClient::new(sender))
    }

    /// Creates `shards` actors (at least one) behind a single routing client.
    pub fn sharded(shards: usize, buffer_size: usize) -> (Vec<Self>, ResourceClient<T>) {
        let shards = shards.max(1);
        let mut actors = Vec::with_capacity(shards);
        let mut senders = Vec::with_capacity(shards);
        for shard in 0..shards {
            let (sender, receiver) = mpsc::channel(buffer_size);
            senders.push(sender);
            actors.push(Self::with_receiver(receiver, shard));
        }
        (actors, ResourceClient::from_shards(senders))
    }

    fn with_receiver(receiver: mpsc::Receiver<ResourceRequest<T>>, shard: usize) -> Self {
        Self {
            receiver,
            store: HashMap::new(),
            shard,
        }
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    ///
    /// # Context Injection
    /// The `context` argument is injected into every entity hook. This allows entities
    /// to access external dependencies (like other clients) that were created *after*
    /// the actor was instantiated but *before* the loop started.
    pub async fn run(mut self, context: T::Context) {
        // Just the type name, e.g. "Product" instead of "courier_escrow::model::product::Product"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        let shard = self.shard;
        info!(entity_type, shard, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create {
                    id,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?params, "Create");
                    if self.store.contains_key(&id) {
                        warn!(entity_type, shard, %id, "Duplicate id");
                        let _ = respond_to.send(Err(FrameworkError::DuplicateId(id.to_string())));
                        continue;
                    }

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, shard, %id, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            info!(entity_type, shard, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, shard, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, shard, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?update, "Update");
                    if let Some(item) = self.store.get_mut(&id) {
                        if let Err(e) = item.on_update(update, &context).await {
                            warn!(entity_type, shard, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        info!(entity_type, shard, %id, "Updated");
                        let _ = respond_to.send(Ok(item.clone()));
                    } else {
                        warn!(entity_type, shard, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items: Vec<T> = self
                        .store
                        .values()
                        .filter(|item| filter.matches(item))
                        .cloned()
                        .collect();
                    debug!(entity_type, shard, matched = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, shard, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(_) => info!(entity_type, shard, %id, "Action ok"),
                            Err(e) => warn!(entity_type, shard, %id, error = %e, "Action failed"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, shard, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
            }
        }

        info!(entity_type, shard, size = self.store.len(), "Shutdown");
    }
}
