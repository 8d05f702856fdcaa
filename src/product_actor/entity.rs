//! [`ActorEntity`] implementation for [`Product`].

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

#[async_trait]
impl ActorEntity for Product {
    type Id = ProductId;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Context = ();
    type Error = ProductError;

    fn mint_id() -> ProductId {
        ProductId::new()
    }

    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, Self::Error> {
        if params.price < Decimal::ZERO {
            return Err(ProductError::InvalidPrice(params.price));
        }
        Ok(Self {
            id,
            seller_id: params.seller_id,
            title: params.title,
            price: params.price,
            currency: params.currency,
            stock: params.stock,
            is_active: true,
        })
    }

    async fn on_update(
        &mut self,
        update: ProductUpdate,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error> {
        if let Some(price) = update.price {
            if price < Decimal::ZERO {
                return Err(ProductError::InvalidPrice(price));
            }
            self.price = price;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ProductAction,
        _ctx: &Self::Context,
    ) -> Result<ProductActionResult, Self::Error> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::ReserveStock(quantity) => {
                if quantity == 0 {
                    return Err(ProductError::InvalidQuantity(quantity));
                }
                if !self.is_active {
                    return Err(ProductError::Inactive(self.id.to_string()));
                }
                if self.stock < quantity {
                    return Err(ProductError::InsufficientStock {
                        requested: quantity,
                        available: self.stock,
                    });
                }
                self.stock -= quantity;
                debug!(product_id = %self.id, quantity, remaining = self.stock, "Stock reserved");
                Ok(ProductActionResult::ReserveStock(self.stock))
            }
            ProductAction::RestoreStock(quantity) => {
                if quantity == 0 {
                    return Err(ProductError::InvalidQuantity(quantity));
                }
                self.stock = self
                    .stock
                    .checked_add(quantity)
                    .ok_or(ProductError::InvalidQuantity(quantity))?;
                debug!(product_id = %self.id, quantity, stock = self.stock, "Stock restored");
                Ok(ProductActionResult::RestoreStock(self.stock))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserId;

    fn product(stock: u32) -> Product {
        Product::from_create_params(
            ProductId::new(),
            ProductCreate {
                seller_id: UserId::new(),
                title: "Atlas silk scarf".to_string(),
                price: Decimal::from(120_000),
                currency: "UZS".to_string(),
                stock,
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn reserve_then_restore_round_trips_stock() {
        let mut p = product(5);
        let reserved = p.handle_action(ProductAction::ReserveStock(2), &()).await;
        assert_eq!(reserved, Ok(ProductActionResult::ReserveStock(3)));
        let restored = p.handle_action(ProductAction::RestoreStock(2), &()).await;
        assert_eq!(restored, Ok(ProductActionResult::RestoreStock(5)));
    }

    #[tokio::test]
    async fn reserve_refuses_oversell_zero_and_inactive() {
        let mut p = product(1);
        assert_eq!(
            p.handle_action(ProductAction::ReserveStock(2), &()).await,
            Err(ProductError::InsufficientStock {
                requested: 2,
                available: 1
            })
        );
        assert_eq!(
            p.handle_action(ProductAction::ReserveStock(0), &()).await,
            Err(ProductError::InvalidQuantity(0))
        );

        p.on_update(
            ProductUpdate {
                is_active: Some(false),
                ..Default::default()
            },
            &(),
        )
        .await
        .unwrap();
        assert!(matches!(
            p.handle_action(ProductAction::ReserveStock(1), &()).await,
            Err(ProductError::Inactive(_))
        ));
        assert_eq!(p.stock, 1);
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = Product::from_create_params(
            ProductId::new(),
            ProductCreate {
                seller_id: UserId::new(),
                title: "Broken".to_string(),
                price: Decimal::from(-1),
                currency: "UZS".to_string(),
                stock: 1,
            },
        );
        assert_eq!(result, Err(ProductError::InvalidPrice(Decimal::from(-1))));
    }
}
