//! Live feed of kitchen events for displays, backed by a `broadcast` channel.
//!
//! Delivery is best effort: a slow subscriber that falls behind the channel capacity
//! loses the oldest events and is told how many it missed.

use crate::model::{ItemKey, OrderId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KitchenEvent {
    NewOrder {
        order_id: OrderId,
        display_id: String,
        branch: String,
        slot_start: DateTime<Utc>,
        visible_at: DateTime<Utc>,
        unit_count: u32,
    },
    /// The order's `visible_at` arrived and staff can now see it.
    OrderVisible {
        order_id: OrderId,
        display_id: String,
        branch: String,
    },
    ItemClaimed {
        key: ItemKey,
        branch: String,
        station: String,
    },
    /// `to` is `None` when the item left its last station.
    ItemAdvanced {
        key: ItemKey,
        branch: String,
        from: String,
        to: Option<String>,
    },
    ItemUnroutable {
        key: ItemKey,
        branch: String,
        product: String,
    },
    OrderCompleted {
        order_id: OrderId,
        branch: String,
    },
}

impl KitchenEvent {
    pub fn name(&self) -> &'static str {
        match self {
            KitchenEvent::NewOrder { .. } => "new_order",
            KitchenEvent::OrderVisible { .. } => "order_visible",
            KitchenEvent::ItemClaimed { .. } => "item_claimed",
            KitchenEvent::ItemAdvanced { .. } => "item_advanced",
            KitchenEvent::ItemUnroutable { .. } => "item_unroutable",
            KitchenEvent::OrderCompleted { .. } => "order_completed",
        }
    }
}

#[derive(Clone)]
pub struct LiveFeed {
    sender: broadcast::Sender<KitchenEvent>,
}

impl LiveFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns how many subscribers the event reached.
    pub fn publish(&self, event: KitchenEvent) -> usize {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(event = name, receivers, "Broadcast");
                receivers
            }
            Err(_) => {
                debug!(event = name, "No live subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<KitchenEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let feed = LiveFeed::new(8);
        let mut rx = feed.subscribe();
        let event = KitchenEvent::OrderCompleted {
            order_id: OrderId::new(),
            branch: "main".into(),
        };
        assert_eq!(feed.publish(event.clone()), 1);
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let feed = LiveFeed::new(8);
        let sent = feed.publish(KitchenEvent::OrderCompleted {
            order_id: OrderId::new(),
            branch: "main".into(),
        });
        assert_eq!(sent, 0);
    }

    #[test]
    fn events_are_tagged_by_type() {
        let json = serde_json::to_value(KitchenEvent::ItemAdvanced {
            key: ItemKey::new(OrderId::new(), 2),
            branch: "main".into(),
            from: "grill".into(),
            to: None,
        })
        .unwrap();
        assert_eq!(json["type"], "item_advanced");
        assert_eq!(json["key"]["index"], 2);
    }
}
