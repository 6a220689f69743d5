//! # Menu Catalog
//!
//! Holds the current [`MenuSnapshot`] behind an `Arc`. Readers clone the `Arc` under a
//! short read lock and work on that snapshot for the rest of their request; a reload
//! builds a complete new snapshot first and swaps it in under the write lock, so no
//! reader ever observes half of two menus.

use crate::model::{MenuDocument, MenuSnapshot};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("Cannot read menu file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed menu document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid menu: {0}")]
    Invalid(String),
}

pub struct MenuCatalog {
    current: RwLock<Arc<MenuSnapshot>>,
}

impl MenuCatalog {
    pub fn new(snapshot: MenuSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn from_document(document: &MenuDocument) -> Result<Self, MenuError> {
        Ok(Self::new(snapshot_of(document)?))
    }

    pub fn snapshot(&self) -> Arc<MenuSnapshot> {
        self.current.read().clone()
    }

    /// Replaces the menu for every subsequent reader.
    pub fn swap(&self, snapshot: MenuSnapshot) {
        let products = snapshot.product_count();
        *self.current.write() = Arc::new(snapshot);
        info!(products, "Menu swapped");
    }

    /// Re-reads `path` and swaps the result in. The current menu stays in place when the
    /// file is unreadable or invalid.
    pub async fn reload(&self, path: &Path) -> Result<MenuDocument, MenuError> {
        let document = load_file(path).await?;
        self.swap(snapshot_of(&document)?);
        Ok(document)
    }
}

pub async fn load_file(path: &Path) -> Result<MenuDocument, MenuError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn snapshot_of(document: &MenuDocument) -> Result<MenuSnapshot, MenuError> {
    MenuSnapshot::build(
        document.products.clone(),
        document.extras.clone(),
        document.bundles.clone(),
    )
    .map_err(MenuError::Invalid)
}
