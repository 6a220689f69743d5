//! [`ActorEntity`] implementation for [`ItemStatus`].
//!
//! An item status owns the per-item state machine and keeps the branch's station
//! board in step with it: the board update is awaited inside the same message that
//! changes the item, and the item only changes once the board has accepted.

use super::actions::ItemAction;
use super::error::ItemError;
use crate::clients::StationBoardClient;
use crate::model::{ItemKey, ItemStage, ItemStatus, ItemStatusCreate, Placement};
use async_trait::async_trait;
use kitchen_actor::ActorEntity;
use tracing::{info, warn};

#[async_trait]
impl ActorEntity for ItemStatus {
    type Id = ItemKey;
    type Create = ItemStatusCreate;
    type Update = ();
    type Action = ItemAction;
    /// The status after the action.
    type ActionResult = ItemStatus;
    type Context = StationBoardClient;
    type Error = ItemError;

    fn key(params: &ItemStatusCreate) -> ItemKey {
        params.key
    }

    fn from_create_params(key: ItemKey, params: ItemStatusCreate) -> Result<Self, ItemError> {
        Ok(Self {
            key,
            unroutable: params.stations.is_empty(),
            branch: params.branch,
            product: params.product,
            bundle: params.bundle,
            stations: params.stations,
            station_index: 0,
            stage: ItemStage::Pending,
            created_at: params.created_at,
            started_at: None,
            completed_at: None,
        })
    }

    /// Lists the new item on its first station, or as unassigned.
    async fn on_create(&mut self, board: &StationBoardClient) -> Result<(), ItemError> {
        let result = match self.stations.first() {
            Some(first) => board.assign(&self.branch, first, self.key).await,
            None => {
                warn!(key = %self.key, product = %self.product, "Item has no station sequence");
                board.mark_unassigned(&self.branch, self.key).await
            }
        };
        result.map_err(|e| ItemError::Board(e.to_string()))
    }

    async fn on_update(&mut self, _update: (), _ctx: &StationBoardClient) -> Result<(), ItemError> {
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: ItemAction,
        board: &StationBoardClient,
    ) -> Result<ItemStatus, ItemError> {
        match action {
            ItemAction::Claim { station, at } => {
                self.ensure_at(&station)?;
                if self.stage != ItemStage::Pending {
                    return Err(ItemError::NotPending {
                        key: self.key.to_string(),
                        stage: self.stage,
                    });
                }
                self.stage = ItemStage::Preparing;
                self.started_at.get_or_insert(at);
                info!(key = %self.key, %station, "Item claimed");
                Ok(self.clone())
            }
            ItemAction::MarkReady { station, at } => {
                self.ensure_at(&station)?;
                let next = self.next_station().map(str::to_string);
                let to = match &next {
                    Some(next) => Placement::Station {
                        station: next.clone(),
                        index: self.station_index + 1,
                    },
                    None => Placement::Done,
                };

                board
                    .move_item(&self.branch, self.key, to)
                    .await
                    .map_err(|e| ItemError::Board(e.to_string()))?;

                match next {
                    Some(next) => {
                        self.station_index += 1;
                        self.stage = ItemStage::Pending;
                        info!(key = %self.key, from = %station, to = %next, index = self.station_index, "Item advanced");
                    }
                    None => {
                        self.stage = ItemStage::Completed;
                        self.completed_at = Some(at);
                        info!(key = %self.key, from = %station, "Item completed");
                    }
                }
                Ok(self.clone())
            }
            ItemAction::Resolve { at } => {
                if !self.unroutable {
                    return Err(ItemError::HasStations(self.key.to_string()));
                }
                if self.stage == ItemStage::Completed {
                    return Err(ItemError::AlreadyCompleted(self.key.to_string()));
                }
                board
                    .move_item(&self.branch, self.key, Placement::Done)
                    .await
                    .map_err(|e| ItemError::Board(e.to_string()))?;

                self.stage = ItemStage::Completed;
                self.started_at.get_or_insert(at);
                self.completed_at = Some(at);
                info!(key = %self.key, product = %self.product, "Unroutable item resolved by hand");
                Ok(self.clone())
            }
        }
    }
}

impl ItemStatus {
    fn ensure_at(&self, station: &str) -> Result<(), ItemError> {
        if self.unroutable {
            return Err(ItemError::Unroutable(self.key.to_string()));
        }
        if self.stage == ItemStage::Completed {
            return Err(ItemError::AlreadyCompleted(self.key.to_string()));
        }
        match self.current_station() {
            Some(current) if current == station => Ok(()),
            current => Err(ItemError::WrongStation {
                key: self.key.to_string(),
                current: current.map(str::to_string),
                requested: station.to_string(),
            }),
        }
    }
}
