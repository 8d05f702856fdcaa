//! # Fulfillment
//!
//! The order state machine:
//!
//! ```text
//! pending ─► confirmed ─► picked_up ─► in_transit ─► delivered
//!    │           │             │            │
//!    └───────────┴──► cancelled ◄───────────┘      (disputed is a side exit
//!                                                   from confirmed onwards)
//! ```
//!
//! - [`guard`]: who may run which transition, from which status.
//! - [`transition`]: pure planner from a command to the next order plus its effects.
//! - [`service`]: the entry point the request layer calls.
//! - [`query`]: paging for the read path.

pub mod guard;
pub mod query;
pub mod service;
pub mod transition;

pub use guard::TransitionKind;
pub use query::{OrderQuery, Page, Paged};
pub use service::FulfillmentService;
pub use transition::{Effect, Plan, Policy};
