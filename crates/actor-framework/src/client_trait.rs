//! # ActorClient Trait
//!
//! Provides a common interface for resource-specific clients, adding default `get` and `list`
//! methods built on top of a generic `ResourceClient`.
use crate::message::Filter;
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit standard read operations.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Parcel { id: u32 }
/// #[derive(Debug)] struct ParcelCreate;
/// #[derive(Debug)] struct ParcelUpdate;
/// #[derive(Debug)] enum ParcelAction {}
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct ParcelError(String);
///
/// impl From<String> for ParcelError {
///     fn from(s: String) -> Self { ParcelError(s) }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Parcel {
///     type Id = u32;
///     type Create = ParcelCreate;
///     type Update = ParcelUpdate;
///     type Action = ParcelAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = ParcelError;
///
///     fn mint_id() -> u32 { 7 }
///     fn from_create_params(id: u32, _: ParcelCreate) -> Result<Self, Self::Error> {
///         Ok(Self { id })
///     }
///     async fn on_update(&mut self, _: ParcelUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: ParcelAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct ParcelClient {
///     inner: ResourceClient<Parcel>,
/// }
///
/// #[async_trait]
/// impl ActorClient<Parcel> for ParcelClient {
///     type Error = ParcelError;
///
///     fn inner(&self) -> &ResourceClient<Parcel> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         ParcelError(e.to_string())
///     }
/// }
///
/// async fn usage(client: ParcelClient) {
///     // get() and list() come with the trait
///     let _ = client.get(1).await;
///     let _ = client.list(actor_framework::Filter::all()).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every entity matching `filter`, in no particular order.
    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: Filter<T>) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list(filter).await.map_err(Self::map_error)
    }
}
