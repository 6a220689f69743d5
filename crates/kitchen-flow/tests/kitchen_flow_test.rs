mod common;

use async_trait::async_trait;
use common::*;
use futures::future::join_all;
use kitchen_actor::ActorClient;
use kitchen_flow::clock::FixedClock;
use kitchen_flow::intake::IntakeError;
use kitchen_flow::item_actor::ItemError;
use kitchen_flow::lifecycle::EventLogs;
use kitchen_flow::menu::snapshot_of;
use kitchen_flow::model::{ItemKey, ItemStage, OrderStatus};
use kitchen_flow::publish::{
    EventLog, FileEventLog, KitchenEvent, MemoryEventLog, OrderRecord, PublishError,
};
use kitchen_flow::routing::{ProgressStage, RoutingError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn concurrent_submissions_never_overbook_a_slot() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let mut config = config();
    config.capacity.max_orders_per_slot = 3;
    let system = start_with(config, clock, EventLogs::in_memory()).await;

    let submissions = (0..20).map(|_| {
        let intake = system.intake.clone();
        tokio::spawn(async move { intake.submit(request(vec![line("Burger", 1)])).await })
    });
    let acks: Vec<_> = join_all(submissions)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().expect("order admitted"))
        .collect();
    assert_eq!(acks.len(), 20);

    let mut per_slot: HashMap<_, u32> = HashMap::new();
    for ack in &acks {
        *per_slot.entry(ack.slot_start).or_default() += 1;
        assert!(ack.visible_at >= at(11, 0));
        assert!(ack.visible_at <= ack.slot_start);
    }
    assert!(per_slot.values().all(|&n| n <= 3), "{per_slot:?}");

    let slots = system
        .scheduler
        .slot_overview(at(11, 0).date_naive())
        .await
        .unwrap();
    assert!(slots.iter().all(|s| s.reserved_orders <= s.max_orders));
    assert_eq!(slots.iter().map(|s| s.reserved_orders).sum::<u32>(), 20);
    // First-fit fills the earliest slots completely.
    assert_eq!(slots[0].start, at(11, 0));
    assert_eq!(slots[0].reserved_orders, 3);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn late_order_is_rejected_and_not_stored() {
    let clock = Arc::new(FixedClock::new(at(21, 58)));
    let system = start(clock).await;

    let result = system.intake.submit(request(vec![line("Burger", 1)])).await;
    assert_eq!(result.unwrap_err(), IntakeError::CapacityExhausted);
    assert!(system.orders.fetch_all().await.unwrap().is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn early_order_waits_for_the_sweep() {
    let clock = Arc::new(FixedClock::new(at(7, 30)));
    let audit_log = Arc::new(MemoryEventLog::new());
    let logs = EventLogs {
        orders: Arc::new(MemoryEventLog::new()),
        audit: audit_log.clone(),
    };
    let system = start_with(config(), clock.clone(), logs).await;
    let mut live = system.live.subscribe();

    let ack = system
        .intake
        .submit(request(vec![line("Burger", 1)]))
        .await
        .unwrap();
    assert_eq!(ack.slot_start, at(9, 0));
    // Prep time: 5 base + 2 per item.
    assert_eq!(ack.visible_at, at(8, 53));
    wait_until(|| !audit_log.is_empty()).await;

    // Nothing reaches a display before visible_at.
    let order = system.orders.fetch(ack.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);
    assert_eq!(order.routed_at, None);
    assert!(system.router.station_queue("main", "grill").await.unwrap().is_empty());
    let burger = ItemKey::new(ack.order_id, 0);
    let early = system.router.mark_ready(burger, "grill").await.unwrap_err();
    assert!(matches!(early, RoutingError::Item(ItemError::NotFound(_))));
    let refused = system.router.assign_order_to_stations(&order).await.unwrap_err();
    assert!(matches!(refused, RoutingError::NotVisible(_)));
    let progress = system.router.order_progress(ack.order_id).await.unwrap();
    assert_eq!(progress.stage, ProgressStage::Queued);

    assert_eq!(system.sweep.sweep_once(at(8, 0)).await.unwrap(), 0);
    assert!(system.router.station_queue("main", "grill").await.unwrap().is_empty());
    assert_eq!(system.sweep.sweep_once(at(9, 0)).await.unwrap(), 1);
    assert_eq!(system.sweep.sweep_once(at(9, 0)).await.unwrap(), 0);

    let order = wait_routed(&system, ack.order_id).await;
    assert_eq!(order.status, OrderStatus::Active);
    let grill = system.router.station_queue("main", "grill").await.unwrap();
    assert_eq!(grill.iter().map(|s| s.key).collect::<Vec<_>>(), vec![burger]);

    let visible = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let KitchenEvent::OrderVisible { order_id, .. } = live.recv().await.unwrap() {
                return order_id;
            }
        }
    })
    .await
    .expect("order_visible broadcast");
    assert_eq!(visible, ack.order_id);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn demand_beyond_capacity_is_turned_away() {
    // 21:00 to 22:00 leaves four slots of two orders each.
    let clock = Arc::new(FixedClock::new(at(21, 0)));
    let mut config = config();
    config.capacity.max_orders_per_slot = 2;
    let system = start_with(config, clock, EventLogs::in_memory()).await;

    let submissions = (0..50).map(|_| {
        let intake = system.intake.clone();
        tokio::spawn(async move { intake.submit(request(vec![line("Fries", 1)])).await })
    });
    let results: Vec<_> = join_all(submissions)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let slots = system
        .scheduler
        .slot_overview(at(21, 0).date_naive())
        .await
        .unwrap();
    let reserved: u32 = slots.iter().map(|s| s.reserved_orders).sum();
    let limit: u32 = slots.iter().map(|s| s.max_orders).sum();
    assert_eq!(slots.len(), 4);
    assert_eq!(limit, 8);
    assert!(reserved <= limit);

    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 8);
    assert_eq!(reserved, 8);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == IntakeError::CapacityExhausted));
    assert_eq!(system.orders.fetch_all().await.unwrap().len(), 8);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn order_travels_through_its_stations_to_completion() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let system = start(clock).await;
    let router = &system.router;

    let ack = system
        .intake
        .submit(request(vec![line("Burger", 1), line("Fries", 1)]))
        .await
        .unwrap();
    assert_eq!(ack.status, "accepted");
    assert_eq!(ack.total_price, Decimal::new(1250, 2));
    assert_eq!(ack.slot_start, at(11, 0));

    let order = wait_routed(&system, ack.order_id).await;
    assert_eq!(order.status, OrderStatus::Active);
    let burger = ItemKey::new(ack.order_id, 0);
    let fries = ItemKey::new(ack.order_id, 1);

    let grill = router.station_queue("main", "grill").await.unwrap();
    assert_eq!(grill.iter().map(|s| s.key).collect::<Vec<_>>(), vec![burger]);
    let fryer = router.station_queue("main", "fryer").await.unwrap();
    assert_eq!(fryer.iter().map(|s| s.key).collect::<Vec<_>>(), vec![fries]);

    let wrong = router.claim(burger, "fryer").await.unwrap_err();
    assert!(matches!(wrong, RoutingError::Item(ItemError::WrongStation { .. })));

    let claimed = router.claim(burger, "grill").await.unwrap();
    assert_eq!(claimed.stage, ItemStage::Preparing);
    let again = router.claim(burger, "grill").await.unwrap_err();
    assert!(matches!(again, RoutingError::Item(ItemError::NotPending { .. })));

    let advanced = router.mark_ready(burger, "grill").await.unwrap();
    assert_eq!(advanced.station_index, 1);
    assert_eq!(advanced.stage, ItemStage::Pending);
    assert!(router.station_queue("main", "grill").await.unwrap().is_empty());
    assert_eq!(router.station_queue("main", "assembly").await.unwrap().len(), 1);

    let progress = router.order_progress(ack.order_id).await.unwrap();
    assert_eq!(
        progress.stage,
        ProgressStage::InProgress {
            current_stage: "fryer".into(),
            stations: vec!["assembly".into(), "fryer".into()],
        }
    );

    let done = router.mark_ready(burger, "assembly").await.unwrap();
    assert_eq!(done.stage, ItemStage::Completed);
    assert_eq!(done.station_index, 1);
    let late = router.mark_ready(burger, "assembly").await.unwrap_err();
    assert!(matches!(late, RoutingError::Item(ItemError::AlreadyCompleted(_))));

    router.mark_ready(fries, "fryer").await.unwrap();

    let progress = router.order_progress(ack.order_id).await.unwrap();
    assert_eq!(progress.stage, ProgressStage::Completed);
    let order = system.orders.fetch(ack.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    let board = router.board("main").await.unwrap();
    assert!(board.stations.values().all(Vec::is_empty));
    assert!(board.same_assignments(&router.derived_board("main").await.unwrap()));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn bundle_expands_into_priced_routable_items() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let system = start(clock).await;

    let ack = system
        .intake
        .submit(request(vec![line("Combo", 1)]))
        .await
        .unwrap();
    assert_eq!(ack.total_price, Decimal::new(1300, 2));

    let order = wait_routed(&system, ack.order_id).await;
    assert_eq!(order.items.len(), 3);
    assert!(order.items.iter().all(|i| i.bundle.as_deref() == Some("Combo")));
    assert!(order.items.iter().all(|i| i.quantity == 1));
    let prices: Vec<_> = order.items.iter().map(|i| i.unit_price).collect();
    assert_eq!(
        prices,
        vec![Decimal::new(434, 2), Decimal::new(433, 2), Decimal::new(433, 2)]
    );

    let drinks = system.router.station_queue("main", "drinks").await.unwrap();
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0].bundle.as_deref(), Some("Combo"));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn item_without_stations_needs_manual_handling() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let system = start(clock).await;

    let ack = system
        .intake
        .submit(request(vec![line("Salad", 1), line("Fries", 1)]))
        .await
        .unwrap();
    let order = wait_routed(&system, ack.order_id).await;
    assert_eq!(order.unroutable_items, vec![0]);

    let salad = ItemKey::new(ack.order_id, 0);
    let unassigned = system.router.unassigned("main").await.unwrap();
    assert_eq!(unassigned.iter().map(|s| s.key).collect::<Vec<_>>(), vec![salad]);

    let progress = system.router.order_progress(ack.order_id).await.unwrap();
    assert_eq!(progress.stage, ProgressStage::NeedsAttention { unroutable: vec![0] });

    let err = system.router.claim(salad, "grill").await.unwrap_err();
    assert!(matches!(err, RoutingError::Item(ItemError::Unroutable(_))));

    let fries = ItemKey::new(ack.order_id, 1);
    let err = system.router.resolve_manually(fries).await.unwrap_err();
    assert!(matches!(err, RoutingError::Item(ItemError::HasStations(_))));
    system.router.mark_ready(fries, "fryer").await.unwrap();

    let resolved = system.router.resolve_manually(salad).await.unwrap();
    assert_eq!(resolved.stage, ItemStage::Completed);
    assert!(resolved.completed_at.is_some());
    assert!(system.router.unassigned("main").await.unwrap().is_empty());
    let again = system.router.resolve_manually(salad).await.unwrap_err();
    assert!(matches!(again, RoutingError::Item(ItemError::AlreadyCompleted(_))));

    let progress = system.router.order_progress(ack.order_id).await.unwrap();
    assert_eq!(progress.stage, ProgressStage::Completed);
    let order = system.orders.fetch(ack.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Completed);

    let rebuilt = system.router.rebuild_assignments("main").await.unwrap();
    assert!(rebuilt.unassigned.is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn rebuilt_board_matches_the_live_one() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let system = start(clock).await;
    let router = &system.router;

    let mut ids = Vec::new();
    for lines in [
        vec![line("Burger", 2)],
        vec![line("Combo", 1), line("Salad", 1)],
        vec![line("Fries", 1)],
    ] {
        let ack = system.intake.submit(request(lines)).await.unwrap();
        wait_routed(&system, ack.order_id).await;
        ids.push(ack.order_id);
    }

    router.mark_ready(ItemKey::new(ids[0], 0), "grill").await.unwrap();
    router.claim(ItemKey::new(ids[1], 1), "fryer").await.unwrap();
    router.mark_ready(ItemKey::new(ids[1], 1), "fryer").await.unwrap();
    router.mark_ready(ItemKey::new(ids[0], 0), "assembly").await.unwrap();
    router.mark_ready(ItemKey::new(ids[2], 0), "fryer").await.unwrap();

    let live = router.board("main").await.unwrap();
    let derived = router.derived_board("main").await.unwrap();
    assert!(live.same_assignments(&derived), "{live:?} vs {derived:?}");

    let rebuilt = router.rebuild_assignments("main").await.unwrap();
    assert!(router.board("main").await.unwrap().same_assignments(&rebuilt));

    // No item is ever listed at two stations.
    for key in { let ids = &ids; (0..3).flat_map(move |i| (0..4).map(move |n| ItemKey::new(ids[i], n))) } {
        assert!(live.holders(&key).len() <= 1);
    }

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn replay_restores_orders_once() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let logs = EventLogs::in_memory();

    let first = start_with(config(), clock.clone(), logs.clone()).await;
    let mut ids = Vec::new();
    for lines in [vec![line("Burger", 1)], vec![line("Combo", 1)]] {
        let ack = first.intake.submit(request(lines)).await.unwrap();
        wait_routed(&first, ack.order_id).await;
        ids.push(ack.order_id);
    }
    first.shutdown().await.unwrap();

    let second = start_with(config(), clock, logs).await;
    let summary = second.replay().await.unwrap();
    assert_eq!(summary.records, 2);
    assert_eq!(summary.restored, 2);
    assert_eq!(summary.skipped, 0);

    for id in &ids {
        let order = second.orders.fetch(*id).await.unwrap().expect("restored");
        assert!(order.routed_at.is_some());
    }
    let board = second.router.board("main").await.unwrap();
    assert_eq!(board.queue("grill").len(), 2);
    assert_eq!(board.queue("fryer").len(), 1);

    let slots = second
        .scheduler
        .slot_overview(at(11, 0).date_naive())
        .await
        .unwrap();
    assert_eq!(slots.iter().map(|s| s.reserved_orders).sum::<u32>(), 2);

    let again = second.replay().await.unwrap();
    assert_eq!(again.restored, 0);
    assert_eq!(second.router.board("main").await.unwrap(), board);
    let slots_after = second
        .scheduler
        .slot_overview(at(11, 0).date_naive())
        .await
        .unwrap();
    assert_eq!(slots_after, slots);

    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn failing_order_log_does_not_affect_admission() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let orders_log = Arc::new(MemoryEventLog::new());
    let audit_log = Arc::new(MemoryEventLog::new());
    orders_log.set_unavailable(true);
    let logs = EventLogs {
        orders: orders_log.clone(),
        audit: audit_log.clone(),
    };
    let mut config = config();
    config.retry_max = 1;
    let system = start_with(config, clock, logs).await;

    let ack = system
        .intake
        .submit(request(vec![line("Fries", 1)]))
        .await
        .expect("admitted despite the log outage");
    wait_routed(&system, ack.order_id).await;

    wait_until(|| !audit_log.is_empty()).await;
    assert_eq!(audit_log.len(), 1);
    assert!(orders_log.is_empty());

    system.shutdown().await.unwrap();
}

/// Log whose appends hang far past any fan-out budget.
struct StalledLog;

#[async_trait]
impl EventLog for StalledLog {
    async fn append(&self, _record: Vec<u8>) -> Result<(), PublishError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<Vec<u8>>, PublishError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn stalled_order_log_does_not_hold_back_routing() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let logs = EventLogs {
        orders: Arc::new(StalledLog),
        audit: Arc::new(StalledLog),
    };
    let mut config = config();
    config.fanout_timeout = Duration::from_millis(300);
    let system = start_with(config, clock, logs).await;
    let mut live = system.live.subscribe();

    let ack = system
        .intake
        .submit(request(vec![line("Fries", 1)]))
        .await
        .unwrap();
    wait_routed(&system, ack.order_id).await;
    assert_eq!(system.router.station_queue("main", "fryer").await.unwrap().len(), 1);

    let announced = tokio::time::timeout(Duration::from_secs(1), live.recv())
        .await
        .expect("new_order broadcast")
        .unwrap();
    assert!(matches!(announced, KitchenEvent::NewOrder { order_id, .. } if order_id == ack.order_id));

    // The stalled appends give up at their budget, so shutdown does not wait 10 s.
    tokio::time::timeout(Duration::from_secs(5), system.shutdown())
        .await
        .expect("shutdown within the fan-out budget")
        .unwrap();
}

#[tokio::test]
async fn detached_submission_finishes_after_the_caller_leaves() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let system = start(clock).await;

    drop(system.intake.spawn_submit(request(vec![line("Burger", 1)])));

    let mut stored = Vec::new();
    for _ in 0..400 {
        stored = system.orders.fetch_all().await.unwrap();
        if !stored.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(stored.len(), 1);
    wait_routed(&system, stored[0].id).await;

    let slots = system
        .scheduler
        .slot_overview(at(11, 0).date_naive())
        .await
        .unwrap();
    assert_eq!(slots.iter().map(|s| s.reserved_orders).sum::<u32>(), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn menu_swap_is_atomic_for_readers() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let system = start(clock).await;

    let before = system.menu.snapshot();
    let mut reduced = menu();
    reduced.products.retain(|p| p.name != "Fries");
    reduced.bundles.clear();
    system.menu.swap(snapshot_of(&reduced).unwrap());

    assert!(before.product("Fries").is_some());
    assert!(system.menu.snapshot().product("Fries").is_none());

    let err = system
        .intake
        .submit(request(vec![line("Fries", 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_item");
    system
        .intake
        .submit(request(vec![line("Burger", 1)]))
        .await
        .unwrap();

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn inventory_check_rejects_before_anything_is_reserved() {
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let mut config = config();
    config.inventory_check = true;
    let system = start_with(config, clock, EventLogs::in_memory()).await;

    // 7 × 150 g beef against 1000 g in stock.
    let err = system
        .intake
        .submit(request(vec![line("Burger", 7)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "insufficient_inventory");

    let mut elsewhere = request(vec![line("Fries", 1)]);
    elsewhere.branch = Some("harbour".into());
    let err = system.intake.submit(elsewhere).await.unwrap_err();
    assert_eq!(err.code(), "insufficient_inventory");

    let slots = system
        .scheduler
        .slot_overview(at(11, 0).date_naive())
        .await
        .unwrap();
    assert!(slots.is_empty());

    system
        .intake
        .submit(request(vec![line("Burger", 6)]))
        .await
        .unwrap();

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn file_log_holds_a_decodable_record() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::new(at(11, 0)));
    let mut config = config();
    config.event_log_dir = dir.path().to_path_buf();
    let logs = EventLogs::open(&config).await.unwrap();
    let system = start_with(config.clone(), clock, logs).await;

    let ack = system
        .intake
        .submit(request(vec![line("Burger", 1), line("Soda", 2)]))
        .await
        .unwrap();
    wait_routed(&system, ack.order_id).await;
    system.shutdown().await.unwrap();

    let log = FileEventLog::open(config.order_log_path()).await.unwrap();
    let frames = log.read_all().await.unwrap();
    assert_eq!(frames.len(), 1);
    let order = OrderRecord::decode(&frames[0]).unwrap().into_order().unwrap();
    assert_eq!(order.id, ack.order_id);
    assert_eq!(order.pricing.final_total, ack.final_price);
    assert_eq!(order.unit_count(), 3);
}
