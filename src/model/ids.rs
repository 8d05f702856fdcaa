//! Typed identifiers.
//!
//! Every resource gets its own UUID newtype so an order id can never be passed where a
//! product id is expected. Ids serialize as bare UUID strings and display with a short
//! resource prefix (`order_…`) for logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($($entity:ident => $prefix:literal),* $(,)?) => {
        paste::paste! {
            $(
                #[doc = "Type-safe identifier for " $entity " records."]
                #[derive(
                    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
                )]
                #[serde(transparent)]
                pub struct [<$entity Id>](pub Uuid);

                impl [<$entity Id>] {
                    /// Mints a fresh random (v4) id.
                    pub fn new() -> Self {
                        Self(Uuid::new_v4())
                    }

                    pub fn as_uuid(&self) -> &Uuid {
                        &self.0
                    }
                }

                impl Default for [<$entity Id>] {
                    fn default() -> Self {
                        Self::new()
                    }
                }

                impl From<Uuid> for [<$entity Id>] {
                    fn from(id: Uuid) -> Self {
                        Self(id)
                    }
                }

                impl fmt::Display for [<$entity Id>] {
                    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                        write!(f, concat!($prefix, "_{}"), self.0)
                    }
                }
            )*
        }
    };
}

define_id! {
    Order => "order",
    Product => "product",
    User => "user",
    Video => "video",
    Transaction => "txn",
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix_but_serde_is_bare_uuid() {
        let raw = Uuid::new_v4();
        let id = OrderId::from(raw);
        assert_eq!(id.to_string(), format!("order_{raw}"));

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{raw}\""));
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn minted_ids_are_distinct() {
        assert_ne!(UserId::new(), UserId::new());
    }
}
