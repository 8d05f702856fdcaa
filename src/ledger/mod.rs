//! # Ledger
//!
//! Append-only journal of the money movements of one order. There is no update or delete:
//! a correction is a new entry. The journal enforces only per-entry rules (right order,
//! non-negative amount); keeping multi-entry effects all-or-nothing is up to the caller that
//! owns the transaction boundary, which here is the order store.

use crate::model::{NewTransaction, OrderId, Transaction, TransactionId, TransactionType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("entry for order {entry} appended to the ledger of order {ledger}")]
    ForeignOrder { ledger: OrderId, entry: OrderId },
    #[error("negative amount {0} for {1}")]
    NegativeAmount(Decimal, TransactionType),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    order_id: OrderId,
    entries: Vec<Transaction>,
}

impl Ledger {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            entries: Vec::new(),
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Checks an entry without appending it.
    pub fn admit(&self, entry: &NewTransaction) -> Result<(), LedgerError> {
        if entry.order_id != self.order_id {
            return Err(LedgerError::ForeignOrder {
                ledger: self.order_id,
                entry: entry.order_id,
            });
        }
        if entry.amount.is_sign_negative() {
            return Err(LedgerError::NegativeAmount(entry.amount, entry.kind));
        }
        Ok(())
    }

    pub fn append(
        &mut self,
        entry: NewTransaction,
        at: DateTime<Utc>,
    ) -> Result<&Transaction, LedgerError> {
        self.admit(&entry)?;
        self.entries.push(Transaction {
            id: TransactionId::new(),
            order_id: entry.order_id,
            user_id: entry.user_id,
            kind: entry.kind,
            amount: entry.amount,
            currency: entry.currency,
            status: entry.status,
            description: entry.description,
            reference_id: entry.reference_id,
            metadata: entry.metadata,
            created_at: at,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Entries in the order they were appended.
    pub fn entries(&self) -> &[Transaction] {
        &self.entries
    }

    pub fn of_kind(&self, kind: TransactionType) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().filter(move |t| t.kind == kind)
    }

    pub fn total_of(&self, kind: TransactionType) -> Decimal {
        self.of_kind(kind).map(|t| t.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PaymentStatus, UserId};

    fn entry(order: OrderId, kind: TransactionType, amount: i64) -> NewTransaction {
        NewTransaction::new(
            order,
            kind,
            Decimal::from(amount),
            "UZS",
            PaymentStatus::Completed,
            format!("{kind} entry"),
        )
    }

    #[test]
    fn append_keeps_chronological_order_and_stamps_entries() {
        let order = OrderId::new();
        let mut ledger = Ledger::new(order);
        let now = Utc::now();

        let seller = UserId::new();
        let first = ledger
            .append(entry(order, TransactionType::Payment, 100).for_user(seller), now)
            .unwrap()
            .clone();
        assert_eq!(first.order_id, order);
        assert_eq!(first.user_id, Some(seller));
        assert_eq!(first.created_at, now);

        ledger
            .append(entry(order, TransactionType::SellerPayout, 90), now)
            .unwrap();
        ledger
            .append(entry(order, TransactionType::PlatformCommission, 10), now)
            .unwrap();

        let kinds: Vec<_> = ledger.entries().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransactionType::Payment,
                TransactionType::SellerPayout,
                TransactionType::PlatformCommission
            ]
        );
        assert_eq!(ledger.total_of(TransactionType::SellerPayout), Decimal::from(90));
        assert_eq!(ledger.of_kind(TransactionType::Refund).count(), 0);
    }

    #[test]
    fn foreign_and_negative_entries_are_refused() {
        let order = OrderId::new();
        let mut ledger = Ledger::new(order);

        let other = OrderId::new();
        assert_eq!(
            ledger.append(entry(other, TransactionType::Refund, 5), Utc::now()),
            Err(LedgerError::ForeignOrder {
                ledger: order,
                entry: other
            })
        );
        assert!(matches!(
            ledger.append(entry(order, TransactionType::Refund, -5), Utc::now()),
            Err(LedgerError::NegativeAmount(..))
        ));
        assert!(ledger.is_empty());
    }
}
