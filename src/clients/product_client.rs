//! # Product Client
//!
//! High-level API over the catalog actor. Entity errors keep their [`ProductError`] type
//! across the channel, so callers can tell "out of stock" from "actor gone".
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Product> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        if let Some(err) = e.entity_error::<ProductError>() {
            return err.clone();
        }
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Fetches a product, treating absence as [`ProductError::NotFound`].
    #[instrument(skip(self))]
    pub async fn require(&self, id: ProductId) -> Result<Product, ProductError> {
        self.get(id)
            .await?
            .ok_or_else(|| ProductError::NotFound(id.to_string()))
    }

    /// Check the current stock level for a product.
    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: ProductId) -> Result<u32, ProductError> {
        debug!("Checking stock");
        match self
            .inner
            .perform_action(id, ProductAction::CheckStock)
            .await
            .map_err(Self::map_error)?
        {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Reserve `quantity` units. Returns the stock left.
    #[instrument(skip(self))]
    pub async fn reserve_stock(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        debug!("Reserving stock");
        match self
            .inner
            .perform_action(id, ProductAction::ReserveStock(quantity))
            .await
            .map_err(Self::map_error)?
        {
            ProductActionResult::ReserveStock(remaining) => Ok(remaining),
            other => Err(unexpected(other)),
        }
    }

    /// Put `quantity` units back. Returns the new stock level.
    #[instrument(skip(self))]
    pub async fn restore_stock(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        debug!("Restoring stock");
        match self
            .inner
            .perform_action(id, ProductAction::RestoreStock(quantity))
            .await
            .map_err(Self::map_error)?
        {
            ProductActionResult::RestoreStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actor_framework::mock::{create_mock_client, expect_action, expect_get};
    use crate::model::UserId;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_check_stock_returns_correct_level() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);
        let product_id = ProductId::new();

        let check_task = tokio::spawn(async move { product_client.check_stock(product_id).await });

        let (id, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(id, product_id);
        assert_eq!(action, ProductAction::CheckStock);

        responder
            .send(Ok(ProductActionResult::CheckStock(42)))
            .unwrap();

        assert_eq!(check_task.await.unwrap().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_reserve_stock_sends_quantity() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);
        let product_id = ProductId::new();

        let reserve_task =
            tokio::spawn(async move { product_client.reserve_stock(product_id, 5).await });

        let (_, action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(action, ProductAction::ReserveStock(5));

        responder
            .send(Ok(ProductActionResult::ReserveStock(3)))
            .unwrap();

        assert_eq!(reserve_task.await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insufficient_stock_stays_typed() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);

        let reserve_task =
            tokio::spawn(async move { product_client.reserve_stock(ProductId::new(), 100).await });

        let (_, _, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        responder
            .send(Err(FrameworkError::EntityError(Box::new(
                ProductError::InsufficientStock {
                    requested: 100,
                    available: 4,
                },
            ))))
            .unwrap();

        assert_eq!(
            reserve_task.await.unwrap(),
            Err(ProductError::InsufficientStock {
                requested: 100,
                available: 4
            })
        );
    }

    #[tokio::test]
    async fn test_missing_product_maps_to_not_found() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);

        let restore_task =
            tokio::spawn(async move { product_client.restore_stock(ProductId::new(), 1).await });

        let (id, _, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        responder
            .send(Err(FrameworkError::NotFound(id.to_string())))
            .unwrap();

        assert!(matches!(
            restore_task.await.unwrap(),
            Err(ProductError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_actor_is_a_communication_error() {
        let (client, receiver) = create_mock_client::<Product>(10);
        drop(receiver);
        let product_client = ProductClient::new(client);

        assert!(matches!(
            product_client.check_stock(ProductId::new()).await,
            Err(ProductError::ActorCommunicationError(_))
        ));
    }

    #[tokio::test]
    async fn test_require_fetches_the_listing() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let product_client = ProductClient::new(client);
        let wanted = ProductId::new();

        let task = tokio::spawn(async move { product_client.require(wanted).await });

        let (id, responder) = expect_get(&mut receiver)
            .await
            .expect("Expected Get request");
        assert_eq!(id, wanted);
        responder
            .send(Ok(Some(Product {
                id,
                seller_id: UserId::new(),
                title: "Suzani pillow".to_string(),
                price: Decimal::from(85_000),
                currency: "UZS".to_string(),
                stock: 4,
                is_active: true,
            })))
            .unwrap();

        let product = task.await.unwrap().unwrap();
        assert_eq!(product.stock, 4);
    }
}
