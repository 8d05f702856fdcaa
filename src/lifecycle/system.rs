use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::{ConfigError, FulfillmentConfig};
use crate::fulfillment::{FulfillmentService, Policy};
use crate::notify::{Dispatcher, Notifier, TracingNotifier};
use crate::order_actor::OrderContext;
use crate::{order_actor, product_actor, user_actor};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("actor task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// The running system: directory, catalog, order shards and the service on top.
///
/// # Architecture
///
/// - **User actor**: one shard, no dependencies.
/// - **Product actor**: one shard, no dependencies. Stock changes are serialized here.
/// - **Order actors**: `config.order_shards` shards, each run with an [`OrderContext`]
///   holding a catalog client and the proof service.
///
/// # Example
///
/// ```rust
/// use courier_escrow::config::FulfillmentConfig;
/// use courier_escrow::lifecycle::FulfillmentSystem;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let system = FulfillmentSystem::new(FulfillmentConfig::default())?;
///     // ... system.service.place_order(...) ...
///     system.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct FulfillmentSystem {
    pub user_client: UserClient,
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    pub service: FulfillmentService,
    handles: Vec<JoinHandle<()>>,
}

impl FulfillmentSystem {
    /// Starts every actor with notifications going to the log. Must be called inside a Tokio
    /// runtime.
    pub fn new(config: FulfillmentConfig) -> Result<Self, ConfigError> {
        Self::with_notifier(config, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(
        config: FulfillmentConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ConfigError> {
        let proofs = config.proof_service()?;
        let mailbox = config.actor_mailbox.max(1);

        // 1. Create actors (no dependencies yet)
        let (user_actor, user_client) = user_actor::new(mailbox);
        let (product_actor, product_client) = product_actor::new(mailbox);
        let (order_actors, order_client) = order_actor::new(config.order_shards, mailbox);
        let shards = order_actors.len();

        // 2. Start actors with injected context
        let mut handles = vec![
            tokio::spawn(user_actor.run(())),
            tokio::spawn(product_actor.run(())),
        ];
        let context = OrderContext {
            catalog: product_client.clone(),
            proofs,
            policy: Policy::from(&config),
        };
        for actor in order_actors {
            handles.push(tokio::spawn(actor.run(context.clone())));
        }

        let service = FulfillmentService::new(
            user_client.clone(),
            product_client.clone(),
            order_client.clone(),
            Dispatcher::new(notifier),
            Arc::new(config),
        );
        info!(order_shards = shards, mailbox, "Fulfillment system started");

        Ok(Self {
            user_client,
            product_client,
            order_client,
            service,
            handles,
        })
    }

    /// Drops every client and waits for the actors to drain.
    ///
    /// Order shards hold catalog clients, so the catalog stops only after the last order shard
    /// has. Clones of the clients or of the service kept elsewhere keep their actors alive and
    /// this call waits for them.
    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        info!("Shutting down fulfillment system");
        drop(self.service);
        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Actor task failed");
                return Err(e.into());
            }
        }
        info!("Fulfillment system stopped");
        Ok(())
    }
}
