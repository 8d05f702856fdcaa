//! # Order Actor
//!
//! The order store. Orders live in [`OrderRecord`]s spread over several shards; an id always
//! hashes to the same shard, so all requests for one order are handled one at a time while
//! different orders move in parallel.
//!
//! Creation goes through `create` with an [`OrderDraft`]; every later change is an
//! [`OrderAction::Transition`]. There is no generic update.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::*;
pub use error::*;

use crate::clients::OrderClient;
use actor_framework::ResourceActor;

/// Creates the order shards and one client routing over all of them.
///
/// Each actor must be run with an [`OrderContext`].
pub fn new(shards: usize, buffer_size: usize) -> (Vec<ResourceActor<OrderRecord>>, OrderClient) {
    let (actors, generic_client) = ResourceActor::sharded(shards, buffer_size);
    (actors, OrderClient::new(generic_client))
}
