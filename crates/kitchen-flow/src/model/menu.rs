//! Menu data: products with their recipe (ingredients and station sequence), extras
//! and bundles. A [`MenuSnapshot`] is immutable once built.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngredientDose {
    pub ingredient: String,
    pub grams: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub ingredients: Vec<IngredientDose>,
    /// Ordered station ids the product passes through. Empty means no routing data.
    #[serde(default)]
    pub stations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub ingredient: Option<IngredientDose>,
}

/// A fixed set of products sold together at one price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    pub name: String,
    pub price: Decimal,
    pub products: Vec<String>,
}

/// On-disk menu document. `stock` seeds per-branch inventory at start-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuDocument {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub extras: Vec<Extra>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    #[serde(default)]
    pub stock: HashMap<String, HashMap<String, u64>>,
}

/// What a line's name resolves to.
#[derive(Debug, Clone, Copy)]
pub enum MenuEntry<'a> {
    Product(&'a Product),
    Bundle(&'a Bundle),
}

/// Consistent, read-only view of the menu at one point in time.
#[derive(Debug, Clone, Default)]
pub struct MenuSnapshot {
    products: HashMap<String, Product>,
    extras: HashMap<String, Extra>,
    bundles: HashMap<String, Bundle>,
}

impl MenuSnapshot {
    /// Builds a snapshot, rejecting negative prices and bundles over unknown products.
    pub fn build(
        products: Vec<Product>,
        extras: Vec<Extra>,
        bundles: Vec<Bundle>,
    ) -> Result<Self, String> {
        let products: HashMap<_, _> = products.into_iter().map(|p| (p.name.clone(), p)).collect();
        let extras: HashMap<_, _> = extras.into_iter().map(|e| (e.name.clone(), e)).collect();
        let bundles: HashMap<_, _> = bundles.into_iter().map(|b| (b.name.clone(), b)).collect();

        if let Some(p) = products.values().find(|p| p.price.is_sign_negative()) {
            return Err(format!("product {} has a negative price", p.name));
        }
        if let Some(e) = extras.values().find(|e| e.price.is_sign_negative()) {
            return Err(format!("extra {} has a negative price", e.name));
        }
        for bundle in bundles.values() {
            if bundle.price.is_sign_negative() {
                return Err(format!("bundle {} has a negative price", bundle.name));
            }
            if bundle.products.is_empty() {
                return Err(format!("bundle {} has no products", bundle.name));
            }
            if let Some(missing) = bundle.products.iter().find(|p| !products.contains_key(*p)) {
                return Err(format!("bundle {} refers to unknown product {missing}", bundle.name));
            }
            if products.contains_key(&bundle.name) {
                return Err(format!("bundle {} shadows a product", bundle.name));
            }
        }

        Ok(Self {
            products,
            extras,
            bundles,
        })
    }

    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.get(name)
    }

    pub fn extra(&self, name: &str) -> Option<&Extra> {
        self.extras.get(name)
    }

    pub fn bundle(&self, name: &str) -> Option<&Bundle> {
        self.bundles.get(name)
    }

    /// Products take precedence; a bundle is only found under a name no product uses.
    pub fn resolve(&self, name: &str) -> Option<MenuEntry<'_>> {
        self.product(name)
            .map(MenuEntry::Product)
            .or_else(|| self.bundle(name).map(MenuEntry::Bundle))
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }
}
