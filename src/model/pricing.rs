//! Order amount snapshot.
//!
//! Amounts are computed once, when the order is placed, from the product price and the
//! fee/commission settings in force at that moment. Later configuration changes never touch
//! an existing order.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Money scale used for every derived amount.
pub const MONEY_SCALE: u32 = 2;

/// The four canonical amounts of an order plus the inputs they were derived from.
///
/// Holds for every value returned by [`OrderAmounts::compute`]:
/// - `seller_amount + platform_commission == subtotal`
/// - `total_amount == subtotal + courier_fee`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAmounts {
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
    pub courier_fee: Decimal,
    pub platform_commission: Decimal,
    pub seller_amount: Decimal,
    pub total_amount: Decimal,
}

impl OrderAmounts {
    /// Returns `None` if any amount falls outside the `Decimal` range.
    pub fn compute(
        unit_price: Decimal,
        quantity: u32,
        courier_fee: Decimal,
        commission_rate: Decimal,
    ) -> Option<Self> {
        let subtotal = unit_price.checked_mul(Decimal::from(quantity))?;
        // Commission is rounded; the seller share absorbs the remainder so the split stays exact.
        let platform_commission = subtotal
            .checked_mul(commission_rate)?
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
        let seller_amount = subtotal.checked_sub(platform_commission)?;
        let total_amount = subtotal.checked_add(courier_fee)?;
        Some(Self {
            unit_price,
            quantity,
            subtotal,
            courier_fee,
            platform_commission,
            seller_amount,
            total_amount,
        })
    }

    /// Sum of what delivery pays out: seller, courier and platform.
    pub fn settlement_total(&self) -> Decimal {
        self.seller_amount + self.courier_fee + self.platform_commission
    }

    pub fn is_balanced(&self) -> bool {
        let subtotal = self.unit_price.checked_mul(Decimal::from(self.quantity));
        let split = self.seller_amount.checked_add(self.platform_commission);
        let total = self.subtotal.checked_add(self.courier_fee);
        subtotal == Some(self.subtotal)
            && split == Some(self.subtotal)
            && total == Some(self.total_amount)
    }
}
