//! # Product Actor
//!
//! The catalog collaborator: product listings and their stock.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](actor_framework::ActorEntity) implementation for [`Product`]
//! - [`error`] - [`ProductError`] type for type-safe error handling
//! - [`actions`] - [`ProductAction`] and [`ProductActionResult`] for stock management
//! - [`new()`] - Factory function that creates the actor and client
//!
//! ## Stock Safety
//!
//! All stock changes for one product are processed by one actor, sequentially. Two orders
//! racing for the last unit both send `ReserveStock(1)`; the first processed wins and the
//! second sees `InsufficientStock`. There is no read-then-write window to oversell through.
//!
//! ## Usage
//!
//! ```rust
//! use courier_escrow::model::{ProductCreate, UserId};
//! use courier_escrow::product_actor;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = product_actor::new(32);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create_product(ProductCreate {
//!             seller_id: UserId::new(),
//!             title: "Suzani pillow".to_string(),
//!             price: Decimal::from(85_000),
//!             currency: "UZS".to_string(),
//!             stock: 10,
//!         })
//!         .await?;
//!
//!     client.reserve_stock(id, 5).await?;
//!     assert_eq!(client.check_stock(id).await?, 5);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::ProductClient;
use crate::model::Product;
use actor_framework::ResourceActor;

/// Creates a new Product actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, ProductClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, ProductClient::new(generic_client))
}
