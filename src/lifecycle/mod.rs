//! # System Lifecycle
//!
//! Starting, wiring and stopping the actors.
//!
//! ## Dependency Injection via Context
//!
//! Actors are created without their dependencies; the dependencies are handed to
//! `run(context)`. The order shards get an [`OrderContext`](crate::order_actor::OrderContext)
//! with a catalog client and the proof service:
//!
//! ```rust,ignore
//! impl ActorEntity for User         { type Context = (); }
//! impl ActorEntity for Product      { type Context = (); }
//! impl ActorEntity for OrderRecord  { type Context = OrderContext; }
//! ```
//!
//! The graph is acyclic (orders → catalog), so dropping every client is enough to stop the
//! whole system: order shards exit first, which releases the last catalog senders.
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the subscriber; see the [`tracing`](self::tracing) module for
//! what gets logged.

pub mod system;
pub mod tracing;

pub use self::system::*;
pub use self::tracing::*;
