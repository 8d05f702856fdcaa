//! # Courier Escrow
//!
//! Order fulfillment for a three-party marketplace: a buyer pays, a seller hands the goods
//! to a courier, the courier hands them to the buyer, and only then is the money split.
//!
//! ## Core
//!
//! - **State machine** ([`fulfillment`]): every status change passes one guard table (role,
//!   party, courier slot, status) and a pure planner that returns the next order plus its
//!   side effects.
//! - **Proofs** ([`proof`]): HMAC-signed QR tokens bound to an order and a handoff step, valid
//!   for 24 hours, plus a six-digit delivery code as the fallback channel.
//! - **Ledger** ([`ledger`]): append-only money movements per order. Delivery appends seller
//!   payout, courier fee and platform commission together; cancellation appends one refund.
//!
//! ## Architecture
//!
//! Everything stateful is a resource actor from `actor_framework`:
//!
//! | Actor | Entity | Shards | Context |
//! |---|---|---|---|
//! | [`user_actor`] | [`User`](model::User) | 1 | `()` |
//! | [`product_actor`] | [`Product`](model::Product) | 1 | `()` |
//! | [`order_actor`] | [`OrderRecord`](order_actor::OrderRecord) | configurable | [`OrderContext`](order_actor::OrderContext) |
//!
//! An order and its ledger are one entity, so a transition and its entries commit in the same
//! actor turn. Each order id hashes to one shard: requests for one order are serialized,
//! requests for different orders run in parallel. That is also what makes courier assignment
//! exclusive: of two racing `accept`s the second one sees the slot taken and gets `Conflict`.
//!
//! ## Quick Start
//!
//! ```rust
//! use courier_escrow::config::FulfillmentConfig;
//! use courier_escrow::lifecycle::FulfillmentSystem;
//! use courier_escrow::model::*;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let system = FulfillmentSystem::new(FulfillmentConfig::default())?;
//!
//!     let buyer = system
//!         .user_client
//!         .create_user(UserCreate {
//!             name: "Aziza".into(),
//!             phone: "+998901112233".into(),
//!             role: Role::Buyer,
//!         })
//!         .await?;
//!     let product = system
//!         .product_client
//!         .create_product(ProductCreate {
//!             seller_id: UserId::new(),
//!             title: "Atlas silk scarf".into(),
//!             price: Decimal::from(50_000),
//!             currency: "UZS".into(),
//!             stock: 5,
//!         })
//!         .await?;
//!
//!     let record = system
//!         .service
//!         .place_order(
//!             Caller::new(buyer, Role::Buyer),
//!             PlaceOrder {
//!                 product_id: product,
//!                 video_id: None,
//!                 quantity: 2,
//!                 payment_method: PaymentMethod::Card,
//!                 shipping: Shipping {
//!                     address: "Amir Temur 1".into(),
//!                     city: "Tashkent".into(),
//!                     phone: "+998901112233".into(),
//!                 },
//!                 buyer_note: None,
//!             },
//!         )
//!         .await?;
//!     assert_eq!(record.order.status, OrderStatus::Pending);
//!     assert_eq!(system.product_client.check_stock(product).await?, 3);
//!
//!     system.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! Run the demo with `RUST_LOG=info cargo run`.

pub mod clients;
pub mod config;
pub mod error;
pub mod fulfillment;
pub mod ledger;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod product_actor;
pub mod proof;
pub mod user_actor;

pub use error::{ErrorKind, FulfillmentError};
