//! # User Actor
//!
//! The directory collaborator: who a user is, how to reach them, and which role they act
//! under. It has no dependencies and no custom actions.
//!
//! ## Usage
//!
//! ```rust
//! use courier_escrow::model::{Role, UserCreate};
//! use courier_escrow::user_actor;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = user_actor::new(32);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client
//!         .create_user(UserCreate {
//!             name: "Dilshod".to_string(),
//!             phone: "+998901234567".to_string(),
//!             role: Role::Courier,
//!         })
//!         .await?;
//!     assert_eq!(client.require(id).await?.role, Role::Courier);
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::UserClient;
use crate::model::User;
use actor_framework::ResourceActor;

/// Creates a new User actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<User>, UserClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, UserClient::new(generic_client))
}
