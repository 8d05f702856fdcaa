//! Pure data structures: typed ids, orders, amounts, ledger entries, products and users.

pub mod ids;
pub mod order;
pub mod pricing;
pub mod product;
pub mod transaction;
pub mod user;

pub use ids::*;
pub use order::*;
pub use pricing::*;
pub use product::*;
pub use transaction::*;
pub use user::*;
