//! Line validation, bundle expansion and order pricing. Pure functions over a menu
//! snapshot; nothing here touches an actor.

use super::{IntakeError, LineRequest};
use crate::model::{Extra, Fulfilment, IngredientDose, MenuEntry, MenuSnapshot, OrderItem, Pricing, Product};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

pub const MAX_QUANTITY: u32 = 99;

/// Money rounding used for every stored amount.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolves every line against `menu` and expands bundles into routable items.
/// Fails on the first invalid line; nothing is partially accepted.
pub fn build_items(lines: &[LineRequest], menu: &MenuSnapshot) -> Result<Vec<OrderItem>, IntakeError> {
    if lines.is_empty() {
        return Err(IntakeError::InvalidRequest("order has no items".into()));
    }
    let mut items = Vec::new();
    for line in lines {
        if line.quantity == 0 || line.quantity > MAX_QUANTITY {
            return Err(IntakeError::InvalidRequest(format!(
                "quantity of {} must be between 1 and {MAX_QUANTITY}",
                line.product
            )));
        }
        let extras = line
            .extras
            .iter()
            .map(|name| {
                menu.extra(name)
                    .ok_or_else(|| IntakeError::InvalidItem(format!("unknown extra {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match menu.resolve(&line.product) {
            Some(MenuEntry::Product(product)) => {
                check_exclusions(line, &[product])?;
                let unit_price = round_money(product.price + extras_price(&extras));
                items.push(item(product, None, line.quantity, unit_price, &extras, line));
            }
            Some(MenuEntry::Bundle(bundle)) => {
                let products = bundle
                    .products
                    .iter()
                    .map(|name| {
                        menu.product(name).ok_or_else(|| {
                            IntakeError::InvalidItem(format!("bundle {} lists unknown {name}", bundle.name))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                check_exclusions(line, &products)?;

                // Extras apply to every component of the bundle.
                let components = Decimal::from(products.len() as u64);
                let unit = bundle.price + components * extras_price(&extras);
                let line_total = round_money(unit * Decimal::from(line.quantity));
                let count = products.len() * line.quantity as usize;
                let mut shares = split_evenly(line_total, count).into_iter();

                for _ in 0..line.quantity {
                    for product in &products {
                        let share = shares.next().unwrap_or(Decimal::ZERO);
                        items.push(item(product, Some(bundle.name.as_str()), 1, share, &extras, line));
                    }
                }
            }
            None => {
                return Err(IntakeError::InvalidItem(format!("unknown product {}", line.product)));
            }
        }
    }
    Ok(items)
}

fn extras_price(extras: &[&Extra]) -> Decimal {
    extras.iter().map(|e| e.price).sum()
}

fn check_exclusions(line: &LineRequest, products: &[&Product]) -> Result<(), IntakeError> {
    let known = |name: &String| {
        products
            .iter()
            .any(|p| p.ingredients.iter().any(|d| &d.ingredient == name))
    };
    match line.excluded.iter().find(|name| !known(*name)) {
        Some(name) => Err(IntakeError::InvalidItem(format!(
            "{} has no ingredient {name} to leave out",
            line.product
        ))),
        None => Ok(()),
    }
}

fn item(
    product: &Product,
    bundle: Option<&str>,
    quantity: u32,
    unit_price: Decimal,
    extras: &[&Extra],
    line: &LineRequest,
) -> OrderItem {
    let mut ingredients: Vec<IngredientDose> = product
        .ingredients
        .iter()
        .filter(|d| !line.excluded.contains(&d.ingredient))
        .cloned()
        .collect();
    ingredients.extend(extras.iter().filter_map(|e| e.ingredient.clone()));

    OrderItem {
        product: product.name.clone(),
        bundle: bundle.map(str::to_string),
        quantity,
        unit_price,
        ingredients,
        extras: extras.iter().map(|e| e.name.clone()).collect(),
        excluded: line.excluded.clone(),
        stations: product.stations.clone(),
    }
}

/// Splits `total` into `parts` amounts whole to the cent; leftover cents go to the
/// first part.
pub fn split_evenly(total: Decimal, parts: usize) -> Vec<Decimal> {
    if parts == 0 {
        return Vec::new();
    }
    let cents = (total * Decimal::ONE_HUNDRED).round().to_i64().unwrap_or(0);
    let parts_i = parts as i64;
    let share = cents / parts_i;
    let remainder = cents - share * parts_i;
    (0..parts)
        .map(|i| {
            let c = if i == 0 { share + remainder } else { share };
            Decimal::new(c, 2)
        })
        .collect()
}

/// Subtotal, delivery fee, discount and final total of an order.
pub fn price(
    items: &[OrderItem],
    fulfilment: &Fulfilment,
    delivery_fee: Option<Decimal>,
    discount: Option<Decimal>,
    discount_percent: Option<Decimal>,
) -> Result<Pricing, IntakeError> {
    let items_subtotal = round_money(items.iter().map(OrderItem::line_total).sum());

    let delivery_fee = match fulfilment {
        Fulfilment::Pickup => Decimal::ZERO,
        Fulfilment::Delivery { .. } => match delivery_fee {
            Some(fee) if fee < Decimal::ZERO => {
                return Err(IntakeError::InvalidRequest("delivery fee must not be negative".into()));
            }
            Some(fee) => round_money(fee),
            None => Decimal::ZERO,
        },
    };

    let discount = match (discount, discount_percent) {
        (Some(_), Some(_)) => {
            return Err(IntakeError::InvalidRequest(
                "give either a discount amount or a percentage, not both".into(),
            ));
        }
        (Some(amount), None) => {
            if amount < Decimal::ZERO {
                return Err(IntakeError::InvalidRequest("discount must not be negative".into()));
            }
            amount
        }
        (None, Some(percent)) => {
            if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                return Err(IntakeError::InvalidRequest(
                    "discount percentage must be between 0 and 100".into(),
                ));
            }
            items_subtotal * percent / Decimal::ONE_HUNDRED
        }
        (None, None) => Decimal::ZERO,
    };
    let discount = round_money(discount.min(items_subtotal));

    Ok(Pricing {
        items_subtotal,
        delivery_fee,
        discount,
        final_total: items_subtotal + delivery_fee - discount,
    })
}

/// Grams per ingredient the whole order consumes.
pub fn ingredient_totals(items: &[OrderItem]) -> HashMap<String, u64> {
    let mut totals = HashMap::new();
    for item in items {
        for dose in &item.ingredients {
            *totals.entry(dose.ingredient.clone()).or_insert(0) +=
                u64::from(dose.grams) * u64::from(item.quantity);
        }
    }
    totals
}
