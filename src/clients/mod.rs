//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient).
//!
//! Each wrapper maps [`FrameworkError`](actor_framework::FrameworkError) back to its actor's
//! own error type and adds the domain calls (`reserve_stock`, `transition`, ...).

pub mod order_client;
pub mod product_client;
pub mod user_client;

pub use order_client::*;
pub use product_client::*;
pub use user_client::*;
