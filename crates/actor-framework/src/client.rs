//! # Generic Client
//!
//! This module defines the generic client for communicating with actors.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Filter, ResourceRequest};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// ## ResourceClient
///
/// The `ResourceClient<T>` provides a type-safe, async API for interacting with one or more
/// `ResourceActor<T>` shards. It forwards requests over Tokio mpsc channels and returns results
/// via oneshot channels.
///
/// Requests that name an id are routed to the shard owning that id. `list` fans out to every
/// shard and concatenates the results in shard order.
///
/// Cloning is cheap: the senders sit behind an `Arc`.
pub struct ResourceClient<T: ActorEntity> {
    senders: Arc<[mpsc::Sender<ResourceRequest<T>>]>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            senders: Arc::clone(&self.senders),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self::from_shards(vec![sender])
    }

    /// Builds a client routing over the given shard senders. Shard order must be stable.
    pub fn from_shards(senders: Vec<mpsc::Sender<ResourceRequest<T>>>) -> Self {
        Self {
            senders: senders.into(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.senders.len()
    }

    fn route(&self, id: &T::Id) -> &mpsc::Sender<ResourceRequest<T>> {
        if self.senders.len() == 1 {
            return &self.senders[0];
        }
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        let index = (hasher.finish() % self.senders.len() as u64) as usize;
        &self.senders[index]
    }

    /// Creates an entity under a freshly minted id.
    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.create_with_id(T::mint_id(), params).await
    }

    /// Creates an entity under a caller-chosen id. Fails with `DuplicateId` if it is taken.
    pub async fn create_with_id(
        &self,
        id: T::Id,
        params: T::Create,
    ) -> Result<T::Id, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.route(&id)
            .send(ResourceRequest::Create {
                id,
                params,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.route(&id)
            .send(ResourceRequest::Get { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.route(&id)
            .send(ResourceRequest::Update {
                id,
                update,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Collects every entity matching `filter` across all shards.
    ///
    /// All shards are asked before any answer is awaited, so they scan concurrently.
    pub async fn list(&self, filter: Filter<T>) -> Result<Vec<T>, FrameworkError> {
        let mut pending = Vec::with_capacity(self.senders.len());
        for sender in self.senders.iter() {
            let (respond_to, response) = oneshot::channel();
            sender
                .send(ResourceRequest::List {
                    filter: filter.clone(),
                    respond_to,
                })
                .await
                .map_err(|_| FrameworkError::ActorClosed)?;
            pending.push(response);
        }

        let mut items = Vec::new();
        for response in pending {
            items.extend(response.await.map_err(|_| FrameworkError::ActorDropped)??);
        }
        Ok(items)
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.route(&id)
            .send(ResourceRequest::Action {
                id,
                action,
                respond_to,
            })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
