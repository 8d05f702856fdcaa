use crate::model::{ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a product listing in the catalog.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](actor_framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](actor_framework::ResourceActor).
///
/// See [`impl ActorEntity for Product`](#impl-ActorEntity-for-Product) for details on:
/// - Creation parameters ([`ProductCreate`])
/// - Update parameters ([`ProductUpdate`])
/// - Custom actions ([`ProductAction`](crate::product_actor::ProductAction))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub stock: u32,
    pub is_active: bool,
}

/// Payload for listing a new product. New listings start active.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub seller_id: UserId,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub stock: u32,
}

/// Payload for editing a listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    pub is_active: Option<bool>,
}
