//! # Actor Framework
//!
//! Building blocks for type-safe, concurrent actor systems in Rust. It implements a
//! **Resource-Oriented Architecture (ROA)** pattern on top of the **Actor Model**: every
//! resource type gets an actor that owns its state, and everything else talks to it through
//! a typed client.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - business logic and domain models
//! 2. **Runtime Layer** ([`ResourceActor`]) - message processing and concurrency
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - type-safe communication
//!
//! Business logic is written once in the entity hooks; the framework handles message
//! passing, error boxing and state ownership.
//!
//! ## Quick Start
//!
//! ```rust
//! use actor_framework::{ActorEntity, Filter, ResourceActor};
//! use async_trait::async_trait;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! static NEXT: AtomicU32 = AtomicU32::new(1);
//!
//! #[derive(Clone, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! #[derive(Debug)] struct UserCreate { name: String }
//! #[derive(Debug)] struct UserUpdate { name: Option<String> }
//! #[derive(Debug)] enum UserAction {}
//! #[derive(Debug, thiserror::Error)] #[error("{0}")] struct UserError(String);
//!
//! #[async_trait]
//! impl ActorEntity for User {
//!     type Id = u32;
//!     type Create = UserCreate;
//!     type Update = UserUpdate;
//!     type Action = UserAction;
//!     type ActionResult = ();
//!     type Context = ();
//!     type Error = UserError;
//!
//!     fn mint_id() -> u32 { NEXT.fetch_add(1, Ordering::Relaxed) }
//!
//!     fn from_create_params(id: u32, params: UserCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { id, name: params.name })
//!     }
//!
//!     async fn on_update(&mut self, update: UserUpdate, _ctx: &()) -> Result<(), Self::Error> {
//!         if let Some(name) = update.name { self.name = name; }
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, _: UserAction, _: &()) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<User>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create(UserCreate { name: "Alice".into() }).await.unwrap();
//!     let user = client.get(id).await.unwrap().unwrap();
//!     assert_eq!(user.name, "Alice");
//!
//!     let named = client.list(Filter::new(|u: &User| u.name.starts_with('A'))).await.unwrap();
//!     assert_eq!(named.len(), 1);
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are injected at **runtime** via `run(context)`, not at construction time.
//! An order actor can therefore be created before the product client it depends on is wired,
//! and receive that client when its loop starts.
//!
//! ## Concurrency Model
//!
//! - Each actor (or shard) runs in its own Tokio task
//! - Messages are processed **sequentially** within a shard, so no locks are needed
//! - Shards and distinct resource types run in **parallel**
//! - An entity always lives on the shard its id hashes to
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real `ResourceClient<T>` from a queue of expectations, so
//! logic that depends on another actor can be tested without spawning it.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Filter, ResourceRequest, Response};
