use crate::model::{OrderId, PaymentStatus, TransactionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of money movement a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Payment,
    EscrowHold,
    EscrowRelease,
    SellerPayout,
    CourierPayout,
    PlatformCommission,
    Refund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "payment",
            TransactionType::EscrowHold => "escrow_hold",
            TransactionType::EscrowRelease => "escrow_release",
            TransactionType::SellerPayout => "seller_payout",
            TransactionType::CourierPayout => "courier_payout",
            TransactionType::PlatformCommission => "platform_commission",
            TransactionType::Refund => "refund",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable ledger entry.
///
/// `user_id` is the party credited or debited; it is `None` for the platform's own
/// commission entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub user_id: Option<UserId>,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub description: String,
    pub reference_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// An entry as requested by a transition, before the ledger stamps id and time on it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub order_id: OrderId,
    pub user_id: Option<UserId>,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub description: String,
    pub reference_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl NewTransaction {
    pub fn new(
        order_id: OrderId,
        kind: TransactionType,
        amount: Decimal,
        currency: impl Into<String>,
        status: PaymentStatus,
        description: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            user_id: None,
            kind,
            amount,
            currency: currency.into(),
            status,
            description: description.into(),
            reference_id: None,
            metadata: None,
        }
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = Some(reference_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
