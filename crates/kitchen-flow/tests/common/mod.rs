#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use kitchen_actor::ActorClient;
use kitchen_flow::clock::FixedClock;
use kitchen_flow::config::Config;
use kitchen_flow::intake::{LineRequest, OrderRequest};
use kitchen_flow::lifecycle::{EventLogs, KitchenSystem};
use kitchen_flow::model::{
    Bundle, Customer, Extra, Fulfilment, IngredientDose, MenuDocument, Order, OrderId, Product,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
}

fn dose(ingredient: &str, grams: u32) -> IngredientDose {
    IngredientDose {
        ingredient: ingredient.to_string(),
        grams,
    }
}

fn product(name: &str, cents: i64, ingredients: Vec<IngredientDose>, stations: &[&str]) -> Product {
    Product {
        name: name.to_string(),
        price: Decimal::new(cents, 2),
        ingredients,
        stations: stations.iter().map(|s| s.to_string()).collect(),
    }
}

/// Burger (grill → assembly), Fries (fryer), Soda (drinks), Salad (no stations),
/// one extra and a three-product combo.
pub fn menu() -> MenuDocument {
    MenuDocument {
        products: vec![
            product(
                "Burger",
                950,
                vec![dose("beef", 150), dose("bun", 80)],
                &["grill", "assembly"],
            ),
            product("Fries", 300, vec![dose("potato", 200)], &["fryer"]),
            product("Soda", 200, vec![], &["drinks"]),
            product("Salad", 600, vec![dose("lettuce", 100)], &[]),
        ],
        extras: vec![Extra {
            name: "Cheese".to_string(),
            price: Decimal::new(100, 2),
            ingredient: Some(dose("cheese", 20)),
        }],
        bundles: vec![Bundle {
            name: "Combo".to_string(),
            price: Decimal::new(1300, 2),
            products: vec!["Burger".into(), "Fries".into(), "Soda".into()],
        }],
        stock: HashMap::from([(
            "main".to_string(),
            HashMap::from([
                ("beef".to_string(), 1_000),
                ("bun".to_string(), 1_000),
                ("potato".to_string(), 1_000),
                ("cheese".to_string(), 100),
            ]),
        )]),
    }
}

pub fn config() -> Config {
    Config {
        // Tests drive the sweep by hand.
        sweep_interval: Duration::from_secs(3600),
        fanout_timeout: Duration::from_secs(2),
        ..Config::default()
    }
}

pub fn line(product: &str, quantity: u32) -> LineRequest {
    LineRequest {
        product: product.to_string(),
        quantity,
        extras: vec![],
        excluded: vec![],
    }
}

pub fn request(lines: Vec<LineRequest>) -> OrderRequest {
    OrderRequest {
        branch: None,
        customer: Customer {
            name: "Ada".to_string(),
            phone: Some("555-0100".to_string()),
            email: None,
        },
        fulfilment: Fulfilment::Pickup,
        items: lines,
        delivery_fee: None,
        discount: None,
        discount_percent: None,
    }
}

pub async fn start(clock: Arc<FixedClock>) -> KitchenSystem {
    start_with(config(), clock, EventLogs::in_memory()).await
}

pub async fn start_with(config: Config, clock: Arc<FixedClock>, logs: EventLogs) -> KitchenSystem {
    KitchenSystem::start(&config, menu(), clock, logs)
        .await
        .expect("system starts")
}

/// Polls `done` until it holds, for up to two seconds.
pub async fn wait_until(done: impl Fn() -> bool) {
    for _ in 0..400 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition never held");
}

/// Polls until the router has recorded the order.
pub async fn wait_routed(system: &KitchenSystem, id: OrderId) -> Order {
    for _ in 0..400 {
        if let Some(order) = system.orders.fetch(id).await.expect("order store reachable") {
            if order.routed_at.is_some() {
                return order;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("order {id} was never routed");
}
