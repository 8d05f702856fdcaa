//! Custom actions for the Product actor.
//!
//! Stock is only ever changed through these actions, one at a time per product, so a
//! reservation is a check-and-set: it succeeds only if the stock is there when the actor
//! processes it.

/// Custom actions for Product entities.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Takes `n` units out of stock.
    ///
    /// # Errors
    /// Fails if the product is inactive, `n` is zero, or `n` exceeds available stock.
    ReserveStock(u32),
    /// Puts `n` previously reserved units back.
    RestoreStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction.
/// Each carries the stock level after the action.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    ReserveStock(u32),
    RestoreStock(u32),
}
