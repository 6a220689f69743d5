//! [`ActorEntity`] implementation for [`BranchStock`].

use super::actions::{InventoryAction, InventoryActionResult};
use super::error::InventoryError;
use crate::model::{BranchStock, StockCreate, StockUpdate};
use async_trait::async_trait;
use kitchen_actor::ActorEntity;

#[async_trait]
impl ActorEntity for BranchStock {
    type Id = String;
    type Create = StockCreate;
    type Update = StockUpdate;
    type Action = InventoryAction;
    type ActionResult = InventoryActionResult;
    type Context = ();
    type Error = InventoryError;

    fn key(params: &StockCreate) -> String {
        params.branch.clone()
    }

    fn from_create_params(branch: String, params: StockCreate) -> Result<Self, InventoryError> {
        Ok(Self {
            branch,
            grams: params.grams,
        })
    }

    /// Sets the listed ingredients to their new absolute level.
    async fn on_update(&mut self, update: StockUpdate, _ctx: &()) -> Result<(), InventoryError> {
        self.grams.extend(update.grams);
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: InventoryAction,
        _ctx: &(),
    ) -> Result<InventoryActionResult, InventoryError> {
        match action {
            InventoryAction::Check { required } => {
                let mut wanted: Vec<_> = required.into_iter().filter(|(_, g)| *g > 0).collect();
                wanted.sort();
                for (ingredient, requested) in wanted {
                    let available = self.available(&ingredient);
                    if available < requested {
                        return Err(InventoryError::Insufficient {
                            branch: self.branch.clone(),
                            ingredient,
                            requested,
                            available,
                        });
                    }
                }
                Ok(InventoryActionResult::Available)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn stock() -> BranchStock {
        BranchStock {
            branch: "main".into(),
            grams: HashMap::from([("flour".to_string(), 500), ("cheese".to_string(), 80)]),
        }
    }

    #[tokio::test]
    async fn check_passes_when_everything_is_covered() {
        let mut stock = stock();
        let required = HashMap::from([("flour".to_string(), 500), ("cheese".to_string(), 0)]);
        let result = stock
            .handle_action(InventoryAction::Check { required }, &())
            .await;
        assert_eq!(result, Ok(InventoryActionResult::Available));
    }

    #[tokio::test]
    async fn check_names_the_short_ingredient() {
        let mut stock = stock();
        let required = HashMap::from([("cheese".to_string(), 120), ("basil".to_string(), 5)]);
        let err = stock
            .handle_action(InventoryAction::Check { required }, &())
            .await
            .unwrap_err();
        // "basil" sorts first and is missing entirely
        assert_eq!(
            err,
            InventoryError::Insufficient {
                branch: "main".into(),
                ingredient: "basil".into(),
                requested: 5,
                available: 0,
            }
        );
        assert_eq!(stock.available("cheese"), 80);
    }

    #[tokio::test]
    async fn update_sets_absolute_levels() {
        let mut stock = stock();
        stock
            .on_update(
                StockUpdate {
                    grams: HashMap::from([("cheese".to_string(), 1000)]),
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(stock.available("cheese"), 1000);
        assert_eq!(stock.available("flour"), 500);
    }
}
