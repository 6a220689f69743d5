//! Per-branch ingredient stock in grams.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchStock {
    pub branch: String,
    pub grams: HashMap<String, u64>,
}

impl BranchStock {
    pub fn available(&self, ingredient: &str) -> u64 {
        self.grams.get(ingredient).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct StockCreate {
    pub branch: String,
    pub grams: HashMap<String, u64>,
}

/// Absolute stock levels to set; ingredients not listed keep their level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockUpdate {
    pub grams: HashMap<String, u64>,
}
