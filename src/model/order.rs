use crate::model::{OrderAmounts, OrderId, ProductId, UserId, VideoId};
use crate::proof::IssuedProof;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Fulfillment status. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    PickedUp,
    InTransit,
    Delivered,
    Cancelled,
    Disputed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::InTransit => "in_transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Disputed => "disputed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Money state, tracked in parallel to [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Held,
    Completed,
    Refunded,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Held => "held",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Cash,
    Payme,
    Click,
}

/// Where the goods go. Fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub address: String,
    pub city: String,
    pub phone: String,
}

/// Why and when an order was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub by: UserId,
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}

/// Who opened a dispute, why, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub by: UserId,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Represents a buyer's order and its fulfillment state.
///
/// # Actor Framework
/// Orders are stored inside [`OrderRecord`](crate::order_actor::OrderRecord), the entity the
/// order store manages, next to their ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub courier_id: Option<UserId>,
    pub product_id: ProductId,
    pub video_id: Option<VideoId>,
    pub amounts: OrderAmounts,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub shipping: Shipping,
    pub buyer_note: Option<String>,
    pub pickup_proof: Option<IssuedProof>,
    pub delivery_proof: Option<IssuedProof>,
    pub delivery_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub in_transit_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancellation: Option<Cancellation>,
    pub dispute: Option<Dispute>,
}

impl Order {
    pub fn quantity(&self) -> u32 {
        self.amounts.quantity
    }

    /// True if `user` is the buyer, the seller or the assigned courier.
    pub fn is_party(&self, user: UserId) -> bool {
        self.buyer_id == user || self.seller_id == user || self.courier_id == Some(user)
    }

    pub fn is_assigned_to(&self, courier: UserId) -> bool {
        self.courier_id == Some(courier)
    }
}

/// Payload for placing an order. The buyer is the caller; seller and price come from the
/// product at the moment of placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub product_id: ProductId,
    pub video_id: Option<VideoId>,
    pub quantity: u32,
    pub payment_method: PaymentMethod,
    pub shipping: Shipping,
    pub buyer_note: Option<String>,
}

fn base36(mut n: u64) -> String {
    let mut digits = Vec::new();
    loop {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Human-readable order number: `{prefix}-{millis in base36}-{4 random base36 chars}`.
///
/// Numbers sort by placement time; the random suffix separates orders placed in the same
/// millisecond.
pub fn order_number(prefix: &str, now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    format!("{prefix}-{}-{suffix}", base36(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn base36_encodes_upper_case() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
    }

    #[test]
    fn order_number_has_prefix_time_and_suffix() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let number = order_number("GGM", now);
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "GGM");
        assert_eq!(parts[1], base36(1_700_000_000_000));
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn status_terminality() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Disputed.is_terminal());
        assert_eq!(OrderStatus::PickedUp.to_string(), "picked_up");
    }
}
