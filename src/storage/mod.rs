// Catalog storage: the trait the reconciliation driver writes through, plus SQLite.

pub mod sqlite;

use crate::model::StorageError;

pub use sqlite::{CatalogSummary, SqliteStorage};

/// The slice of catalog access the reconciliation driver needs.
pub trait CatalogStore {
    /// All product names in catalog order, duplicates included.
    fn product_names(&self) -> Result<Vec<String>, StorageError>;

    /// Sets the image reference on every row whose name equals `product`.
    /// Returns the number of rows updated.
    fn set_image_url(&mut self, product: &str, image_url: &str) -> Result<usize, StorageError>;

    /// Reads back the image reference of every row named `product`.
    fn image_urls_for(&self, product: &str) -> Result<Vec<String>, StorageError>;
}
