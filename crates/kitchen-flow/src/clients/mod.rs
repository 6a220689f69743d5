//! Type-safe wrappers around [`ResourceClient`](kitchen_actor::ResourceClient), one
//! per actor. Each maps `FrameworkError` into its actor's own error enum and gets
//! `fetch` / `fetch_all` from [`ActorClient`](kitchen_actor::ActorClient).

pub mod inventory_client;
pub mod item_client;
pub mod order_client;
pub mod slot_client;
pub mod station_client;

pub use inventory_client::*;
pub use item_client::*;
pub use order_client::*;
pub use slot_client::*;
pub use station_client::*;
