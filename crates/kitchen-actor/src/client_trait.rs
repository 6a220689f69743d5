//! # ActorClient Trait
//!
//! Common interface for resource-specific clients: default `fetch` and `fetch_all`
//! built on top of a generic `ResourceClient`, with errors mapped into the
//! resource's own error type.
use crate::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the read operations.
///
/// # Example
///
/// ```rust
/// use kitchen_actor::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Oven { id: u32 }
/// #[derive(Debug)] struct OvenCreate { id: u32 }
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct OvenError(String);
///
/// #[async_trait]
/// impl ActorEntity for Oven {
///     type Id = u32; type Create = OvenCreate; type Update = (); type Action = ();
///     type ActionResult = (); type Context = (); type Error = OvenError;
///     fn key(params: &OvenCreate) -> u32 { params.id }
///     fn from_create_params(id: u32, _: OvenCreate) -> Result<Self, OvenError> { Ok(Self { id }) }
///     async fn on_update(&mut self, _: (), _: &()) -> Result<(), OvenError> { Ok(()) }
///     async fn handle_action(&mut self, _: (), _: &()) -> Result<(), OvenError> { Ok(()) }
/// }
///
/// struct OvenClient { inner: ResourceClient<Oven> }
///
/// #[async_trait]
/// impl ActorClient<Oven> for OvenClient {
///     type Error = OvenError;
///     fn inner(&self) -> &ResourceClient<Oven> { &self.inner }
///     fn map_error(e: FrameworkError) -> OvenError { OvenError(e.to_string()) }
/// }
///
/// async fn usage(client: OvenClient) {
///     // fetch() and fetch_all() are provided.
///     let _ = client.fetch(1).await;
///     let _ = client.fetch_all().await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by key.
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every entity across all shards.
    #[tracing::instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }
}
