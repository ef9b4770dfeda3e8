use crate::model::{Product, StorageError, Store, StorePrice};
use crate::storage::CatalogStore;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, Row};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const PRODUCT_COLUMNS: &str = "rowid, product, category, weight,
    carrefour_current, carrefour_original,
    naivas_current, naivas_original,
    quickmart_current, quickmart_original,
    cheapest_price, image_url, is_discounted_anywhere";

/// Snapshot of the catalog's shape, for the `check` diagnostic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSummary {
    /// False when the file holds no `products` table; everything else is then empty.
    pub table_exists: bool,
    pub columns: Vec<(String, String)>,
    pub total: usize,
    /// First rows as `(column, value)` pairs, in table column order.
    pub samples: Vec<Vec<(String, String)>>,
    pub milk_count: usize,
    pub categories: Vec<String>,
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the catalog database and applies migrations.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Like [`open`](Self::open), but refuses a missing database file or one
    /// without a `products` table. Nothing is created or migrated in that case.
    pub fn open_existing(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        if !db_path.is_file() {
            return Err(StorageError::NotFound(db_path.display().to_string()));
        }
        let conn = Connection::open(db_path)?;
        if !Self::has_products_table(&conn)? {
            return Err(StorageError::MissingTable(db_path.display().to_string()));
        }
        Self::from_connection(conn)
    }

    /// Read-only diagnostic of an existing catalog file. Never migrates, so a
    /// missing `products` table is reported rather than created.
    pub fn inspect(db_path: impl AsRef<Path>, sample_size: usize) -> Result<CatalogSummary, StorageError> {
        let db_path = db_path.as_ref();
        if !db_path.is_file() {
            return Err(StorageError::NotFound(db_path.display().to_string()));
        }
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Self::summarize(&conn, sample_size)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS products (
                product TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT '',
                weight TEXT,
                carrefour_current REAL,
                carrefour_original,
                naivas_current REAL,
                naivas_original,
                quickmart_current REAL,
                quickmart_original,
                cheapest_price REAL,
                image_url TEXT NOT NULL DEFAULT '',
                is_discounted_anywhere INTEGER NOT NULL DEFAULT 0
            );
            ",
        )?;

        // Spreadsheet-seeded tables may predate some columns
        for (column, def) in [
            ("category", "TEXT NOT NULL DEFAULT ''"),
            ("weight", "TEXT"),
            ("carrefour_current", "REAL"),
            ("carrefour_original", ""),
            ("naivas_current", "REAL"),
            ("naivas_original", ""),
            ("quickmart_current", "REAL"),
            ("quickmart_original", ""),
            ("cheapest_price", "REAL"),
            ("image_url", "TEXT NOT NULL DEFAULT ''"),
            ("is_discounted_anywhere", "INTEGER NOT NULL DEFAULT 0"),
        ] {
            Self::migrate_add_column_if_missing(&conn, "products", column, def)?;
        }

        Ok(Self { conn })
    }

    fn has_products_table(conn: &Connection) -> Result<bool, StorageError> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'products'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Checks whether a column exists and adds it to the table if not
    fn migrate_add_column_if_missing(
        conn: &Connection,
        table: &str,
        column: &str,
        column_def: &str,
    ) -> Result<(), StorageError> {
        let existing_columns = Self::table_columns(conn, table)?;

        if !existing_columns.iter().any(|(c, _)| c == column) {
            let alter_sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def);
            conn.execute(&alter_sql, [])?;
            debug!("Added column {}.{}", table, column);
        }

        Ok(())
    }

    fn table_columns(conn: &Connection, table: &str) -> Result<Vec<(String, String)>, StorageError> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<_, _>>()?;
        Ok(columns)
    }

    /// Inserts a product row and returns its rowid.
    pub fn insert_product(&self, product: &Product) -> Result<i64, StorageError> {
        let price = |store: Store| product.price_at(store);
        self.conn.execute(
            "INSERT INTO products (
                product, category, weight,
                carrefour_current, carrefour_original,
                naivas_current, naivas_original,
                quickmart_current, quickmart_original,
                cheapest_price, image_url, is_discounted_anywhere
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                &product.name,
                &product.category,
                &product.weight,
                price(Store::Carrefour).current,
                price(Store::Carrefour).original,
                price(Store::Naivas).current,
                price(Store::Naivas).original,
                price(Store::Quickmart).current,
                price(Store::Quickmart).original,
                product.cheapest_price,
                product.image_url.as_deref().unwrap_or(""),
                product.is_discounted,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Rows whose name or category contains `search` (case-insensitive),
    /// optionally narrowed to one category.
    pub fn search_products(
        &self,
        search: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, StorageError> {
        let mut sql = format!("SELECT {} FROM products", PRODUCT_COLUMNS);
        let mut conditions = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim().to_lowercase());
            conditions.push("(LOWER(product) LIKE ? OR LOWER(category) LIKE ?)");
            values.push(pattern.clone());
            values.push(pattern);
        }
        if let Some(category) = category {
            conditions.push("LOWER(category) = ?");
            values.push(category.to_lowercase());
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY rowid");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values), Self::map_product)?;
        let mut products = Vec::new();
        for product in rows {
            products.push(product?);
        }
        Ok(products)
    }

    pub fn get_all_products(&self) -> Result<Vec<Product>, StorageError> {
        self.search_products(None, None)
    }

    /// First row whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Product>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM products WHERE product = ?1 ORDER BY rowid LIMIT 1",
            PRODUCT_COLUMNS
        ))?;
        let mut rows = stmt.query(params![name])?;
        match rows.next()? {
            Some(row) => Ok(Some(Self::map_product(row)?)),
            None => Ok(None),
        }
    }

    pub fn categories(&self) -> Result<Vec<String>, StorageError> {
        Self::distinct_categories(&self.conn, None)
    }

    /// Distinct categories containing `query` (case-insensitive), sorted.
    pub fn categories_matching(&self, query: &str) -> Result<Vec<String>, StorageError> {
        Self::distinct_categories(&self.conn, Some(query))
    }

    fn distinct_categories(conn: &Connection, query: Option<&str>) -> Result<Vec<String>, StorageError> {
        let (sql, values) = match query {
            Some(q) => (
                "SELECT DISTINCT category FROM products
                 WHERE category IS NOT NULL AND LOWER(category) LIKE ?1 ORDER BY category",
                vec![format!("%{}%", q.trim().to_lowercase())],
            ),
            None => (
                "SELECT DISTINCT category FROM products WHERE category IS NOT NULL ORDER BY category",
                Vec::new(),
            ),
        };
        let mut stmt = conn.prepare(sql)?;
        let categories = stmt
            .query_map(rusqlite::params_from_iter(values), |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        Ok(categories)
    }

    pub fn summary(&self, sample_size: usize) -> Result<CatalogSummary, StorageError> {
        Self::summarize(&self.conn, sample_size)
    }

    fn summarize(conn: &Connection, sample_size: usize) -> Result<CatalogSummary, StorageError> {
        if !Self::has_products_table(conn)? {
            return Ok(CatalogSummary::default());
        }

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        let milk_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM products WHERE LOWER(product) LIKE '%milk%'",
            [],
            |row| row.get(0),
        )?;

        // SELECT * so the sample reflects the table as it is, migrated or not
        let mut stmt = conn.prepare("SELECT * FROM products ORDER BY rowid LIMIT ?1")?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let samples = stmt
            .query_map(params![sample_size as i64], |row| {
                names
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Ok((name.clone(), display_value(row.get_ref(i)?))))
                    .collect::<Result<Vec<_>, rusqlite::Error>>()
            })?
            .collect::<Result<_, _>>()?;

        Ok(CatalogSummary {
            table_exists: true,
            columns: Self::table_columns(conn, "products")?,
            total: total as usize,
            samples,
            milk_count: milk_count as usize,
            categories: Self::distinct_categories(conn, None)?,
        })
    }

    fn map_product(row: &Row) -> Result<Product, rusqlite::Error> {
        let mut prices = BTreeMap::new();
        for (offset, store) in Store::ALL.iter().enumerate() {
            let idx = 4 + offset * 2;
            prices.insert(
                *store,
                StorePrice {
                    current: price_value(row.get_ref(idx)?),
                    original: price_value(row.get_ref(idx + 1)?),
                },
            );
        }

        let image_url: Option<String> = row.get(11)?;
        let is_discounted: Option<i64> = row.get(12)?;

        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            weight: text_value(row.get_ref(3)?),
            prices,
            cheapest_price: price_value(row.get_ref(10)?),
            image_url: image_url.filter(|u| !u.is_empty()),
            is_discounted: is_discounted.unwrap_or(0) != 0,
        })
    }
}

impl CatalogStore for SqliteStorage {
    fn product_names(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT product FROM products ORDER BY rowid")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        Ok(names)
    }

    fn set_image_url(&mut self, product: &str, image_url: &str) -> Result<usize, StorageError> {
        let updated = self.conn.execute(
            "UPDATE products SET image_url = ?1 WHERE product = ?2",
            params![image_url, product],
        )?;
        Ok(updated)
    }

    fn image_urls_for(&self, product: &str) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT image_url FROM products WHERE product = ?1 ORDER BY rowid")?;
        let urls = stmt
            .query_map(params![product], |row| {
                Ok(row.get::<_, Option<String>>(0)?.unwrap_or_default())
            })?
            .collect::<Result<_, _>>()?;
        Ok(urls)
    }
}

/// Prices arrive as REAL, INTEGER or text placeholders such as "–".
fn price_value(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => std::str::from_utf8(t).ok()?.trim().parse().ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

fn text_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).to_string()),
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

fn display_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
        other => text_value(other).unwrap_or_default(),
    }
}
