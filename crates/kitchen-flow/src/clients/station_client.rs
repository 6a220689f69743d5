//! # Station Board Client
//!
//! Every write goes through `ensure_action`, so a branch's board comes into existence
//! with its first item.
use crate::model::{BoardCreate, BoardEntry, ItemKey, Placement, StationBoard};
use crate::station_actor::{StationAction, StationError};
use async_trait::async_trait;
use kitchen_actor::{ActorClient, FrameworkError, ResourceClient};
use tracing::instrument;

#[derive(Clone)]
pub struct StationBoardClient {
    inner: ResourceClient<StationBoard>,
}

impl StationBoardClient {
    pub fn new(inner: ResourceClient<StationBoard>) -> Self {
        Self { inner }
    }

    async fn apply(&self, branch: &str, action: StationAction) -> Result<(), StationError> {
        self.inner
            .ensure_action(
                BoardCreate {
                    branch: branch.to_string(),
                },
                action,
            )
            .await
            .map_err(Self::map_error)
    }

    /// Lists a new item on the first station of its sequence.
    #[instrument(skip(self))]
    pub async fn assign(&self, branch: &str, station: &str, key: ItemKey) -> Result<(), StationError> {
        self.move_item(
            branch,
            key,
            Placement::Station {
                station: station.to_string(),
                index: 0,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn move_item(&self, branch: &str, key: ItemKey, to: Placement) -> Result<(), StationError> {
        self.apply(branch, StationAction::Place { key, to }).await
    }

    #[instrument(skip(self))]
    pub async fn mark_unassigned(&self, branch: &str, key: ItemKey) -> Result<(), StationError> {
        self.move_item(branch, key, Placement::Unassigned).await
    }

    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn reconcile(&self, branch: &str, entries: Vec<BoardEntry>) -> Result<(), StationError> {
        self.apply(branch, StationAction::Reconcile { entries }).await
    }

    /// The branch's board; empty if nothing was ever routed there.
    pub async fn board(&self, branch: &str) -> Result<StationBoard, StationError> {
        Ok(self
            .fetch(branch.to_string())
            .await?
            .unwrap_or_else(|| StationBoard {
                branch: branch.to_string(),
                ..StationBoard::default()
            }))
    }
}

#[async_trait]
impl ActorClient<StationBoard> for StationBoardClient {
    type Error = StationError;

    fn inner(&self) -> &ResourceClient<StationBoard> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<StationError>().unwrap_or_else(|e| match e {
            FrameworkError::NotFound(branch) => StationError::NotFound(branch),
            other => StationError::ActorCommunicationError(other.to_string()),
        })
    }
}
