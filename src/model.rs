// Core structs: Product, Store, StorePrice, and the error types
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Supermarket chains tracked by the catalog. Declaration order is the
/// tie-break order whenever two stores share the lowest price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Store {
    Carrefour,
    Naivas,
    Quickmart,
}

impl Store {
    pub const ALL: [Store; 3] = [Store::Carrefour, Store::Naivas, Store::Quickmart];

    /// Column prefix used in the `products` table.
    pub fn column_prefix(&self) -> &'static str {
        match self {
            Store::Carrefour => "carrefour",
            Store::Naivas => "naivas",
            Store::Quickmart => "quickmart",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Store::Carrefour => "Carrefour",
            Store::Naivas => "Naivas",
            Store::Quickmart => "Quickmart",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StorePrice {
    pub current: Option<f64>,
    pub original: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub weight: Option<String>,
    pub prices: BTreeMap<Store, StorePrice>,
    pub cheapest_price: Option<f64>,
    pub image_url: Option<String>,
    pub is_discounted: bool,
}

impl Product {
    pub fn price_at(&self, store: Store) -> StorePrice {
        self.prices.get(&store).copied().unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("catalog not found: {0}")]
    NotFound(String),
    #[error("catalog has no products table: {0}")]
    MissingTable(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("image folder not found: {0}")]
    FolderNotFound(String),
    #[error("failed to list image folder: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read image entry: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
