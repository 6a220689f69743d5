//! [`ActorEntity`] implementation for [`StationBoard`], one per branch.

use super::actions::StationAction;
use super::error::StationError;
use crate::model::{BoardCreate, StationBoard};
use async_trait::async_trait;
use kitchen_actor::ActorEntity;
use tracing::{debug, warn};

#[async_trait]
impl ActorEntity for StationBoard {
    type Id = String;
    type Create = BoardCreate;
    type Update = ();
    type Action = StationAction;
    type ActionResult = ();
    type Context = ();
    type Error = StationError;

    fn key(params: &BoardCreate) -> String {
        params.branch.clone()
    }

    fn from_create_params(branch: String, _params: BoardCreate) -> Result<Self, StationError> {
        Ok(Self {
            branch,
            ..Self::default()
        })
    }

    async fn on_update(&mut self, _update: (), _ctx: &()) -> Result<(), StationError> {
        Ok(())
    }

    async fn handle_action(&mut self, action: StationAction, _ctx: &()) -> Result<(), StationError> {
        match action {
            StationAction::Place { key, to } => {
                if !self.place(key, to.clone()) {
                    debug!(branch = %self.branch, %key, ?to, "Placement already current or stale");
                }
            }
            StationAction::Reconcile { entries } => {
                let total = entries.len();
                let corrected = entries
                    .into_iter()
                    .filter(|entry| self.place(entry.key, entry.placement.clone()))
                    .count();
                if corrected > 0 {
                    warn!(branch = %self.branch, corrected, total, "Station board drifted from item statuses");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoardEntry, ItemKey, OrderId, Placement};

    fn board() -> StationBoard {
        StationBoard::from_create_params("main".into(), BoardCreate { branch: "main".into() })
            .unwrap()
    }

    fn at(station: &str, index: usize) -> Placement {
        Placement::Station {
            station: station.into(),
            index,
        }
    }

    async fn place(board: &mut StationBoard, key: ItemKey, to: Placement) {
        board
            .handle_action(StationAction::Place { key, to }, &())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn placing_twice_has_set_semantics() {
        let mut board = board();
        let key = ItemKey::new(OrderId::new(), 0);
        place(&mut board, key, at("prep", 0)).await;
        place(&mut board, key, at("prep", 0)).await;
        assert_eq!(board.queue("prep"), &[key]);
    }

    #[tokio::test]
    async fn move_leaves_a_single_holder() {
        let mut board = board();
        let key = ItemKey::new(OrderId::new(), 1);
        board.insert("prep", key);
        board.insert("oven", key); // stray entry

        place(&mut board, key, at("pack", 1)).await;
        assert_eq!(board.holders(&key), vec!["pack"]);

        place(&mut board, key, Placement::Done).await;
        assert!(board.holders(&key).is_empty());
        assert!(board.stations.is_empty());
    }

    #[tokio::test]
    async fn stale_rebuild_entry_does_not_undo_a_move() {
        let mut board = board();
        let moved = ItemKey::new(OrderId::new(), 0);
        let drifted = ItemKey::new(OrderId::new(), 1);
        place(&mut board, moved, at("grill", 0)).await;
        place(&mut board, moved, at("assembly", 1)).await;
        board.insert("fryer", drifted);

        // Read before the move landed.
        let entries = vec![
            BoardEntry {
                key: moved,
                placement: at("grill", 0),
            },
            BoardEntry {
                key: drifted,
                placement: at("drinks", 0),
            },
        ];
        board
            .handle_action(StationAction::Reconcile { entries }, &())
            .await
            .unwrap();

        assert_eq!(board.holders(&moved), vec!["assembly"]);
        assert_eq!(board.holders(&drifted), vec!["drinks"]);
    }

    #[tokio::test]
    async fn resolved_unassigned_item_stays_off_the_board() {
        let mut board = board();
        let key = ItemKey::new(OrderId::new(), 2);
        place(&mut board, key, Placement::Unassigned).await;
        assert_eq!(board.unassigned, vec![key]);

        place(&mut board, key, Placement::Done).await;
        assert!(board.unassigned.is_empty());

        // A replayed mark cannot bring it back.
        place(&mut board, key, Placement::Unassigned).await;
        assert!(board.unassigned.is_empty());
    }
}
