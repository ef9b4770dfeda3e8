use beiradar::analyzer::catalog::suggestion_query;
use beiradar::analyzer::price_analysis::{is_on_sale, max_discount};
use beiradar::analyzer::{
    best_price, build_suggestions, compare_cart, find_deals, find_department, format_price,
    resolve_subcategory, Cart, ProductFilter, DEPARTMENTS,
};
use beiradar::cli::{Cli, Commands};
use beiradar::config::{load_config_or_default, AppConfig};
use beiradar::matcher::CandidateMatcher;
use beiradar::model::{ConfigError, Product, ReconcileError, StorageError, Store};
use beiradar::reconcile::Reconciler;
use beiradar::source::DirectorySource;
use beiradar::storage::SqliteStorage;
use clap::Parser;
use thiserror::Error;
use tracing::{error, info, warn, Level};

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("failed to read cart: {0}")]
    Cart(String),
    #[error("unknown department: {0}")]
    UnknownDepartment(String),
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = load_config_or_default(&cli.config)?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    match cli.command {
        Commands::Reconcile { images, report } => {
            if let Some(images) = images {
                config.image_folder = images;
            }
            if report.is_some() {
                config.report_path = report;
            }
            reconcile(&config)
        }
        Commands::Check { samples } => check(&config, samples),
        Commands::Search {
            query,
            category,
            min_price,
            max_price,
            min_discount,
        } => {
            let filter = ProductFilter {
                min_price,
                max_price,
                min_discount,
            };
            search(&config, query.as_deref(), category.as_deref(), filter)
        }
        Commands::Suggest { query } => suggest(&config, &query),
        Commands::Categories { department } => categories(department.as_deref()),
        Commands::Browse {
            subcategory,
            min_price,
            max_price,
            min_discount,
        } => {
            let filter = ProductFilter {
                min_price,
                max_price,
                min_discount,
            };
            browse(&config, &subcategory, filter)
        }
        Commands::Deals { limit } => deals(&config, limit),
        Commands::Cart { file } => {
            let content = std::fs::read_to_string(&file).map_err(|e| AppError::Cart(e.to_string()))?;
            let cart: Cart =
                serde_json::from_str(&content).map_err(|e| AppError::Cart(e.to_string()))?;
            cart_totals(&config, &cart)
        }
    }
}

fn reconcile(config: &AppConfig) -> Result<(), AppError> {
    let source = DirectorySource::new(&config.image_folder);
    let matcher = CandidateMatcher::new(&config.matcher, &config.image_url_prefix);

    // The connection lives for this scope only and is closed on every exit path
    let report = {
        let mut storage = SqliteStorage::open_existing(&config.db_path)?;
        Reconciler::new(matcher).run(&mut storage, &source)?
    };

    report.log_summary();
    if let Some(path) = &config.report_path {
        report.write_json(path)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

fn check(config: &AppConfig, samples: usize) -> Result<(), AppError> {
    let summary = SqliteStorage::inspect(&config.db_path, samples)?;

    info!("{}", "=".repeat(60));
    info!("DATABASE DIAGNOSTIC: {}", config.db_path.display());
    info!("{}", "=".repeat(60));
    if !summary.table_exists {
        warn!("Table 'products' does not exist!");
        return Ok(());
    }
    info!("Table 'products' exists");
    info!("Columns in 'products' table ({} total):", summary.columns.len());
    for (name, kind) in &summary.columns {
        info!("  - {} ({})", name, kind);
    }
    info!("Total products: {}", summary.total);
    if summary.total == 0 {
        warn!("No products in database!");
        return Ok(());
    }

    for (i, row) in summary.samples.iter().enumerate() {
        info!("--- Product {} ---", i + 1);
        for (column, value) in row {
            info!("  {}: {}", column, value);
        }
    }
    info!("Products containing 'milk': {}", summary.milk_count);
    info!("Categories ({} total):", summary.categories.len());
    for category in &summary.categories {
        info!("  - {}", category);
    }
    Ok(())
}

fn search(
    config: &AppConfig,
    query: Option<&str>,
    category: Option<&str>,
    filter: ProductFilter,
) -> Result<(), AppError> {
    let storage = SqliteStorage::open_existing(&config.db_path)?;
    let products = filter.apply(storage.search_products(query, category)?);

    info!("{} products found", products.len());
    for p in &products {
        log_product(p);
    }
    Ok(())
}

fn suggest(config: &AppConfig, raw: &str) -> Result<(), AppError> {
    let Some(query) = suggestion_query(raw) else {
        info!("0 suggestions");
        return Ok(());
    };
    let storage = SqliteStorage::open_existing(&config.db_path)?;
    let products = storage.search_products(Some(&query), None)?;
    let categories = storage.categories_matching(&query)?;

    let suggestions = build_suggestions(&products, &categories);
    info!("{} suggestions", suggestions.len());
    for s in &suggestions {
        info!("  {:?}: {}", s.kind, s.text);
    }
    Ok(())
}

fn categories(department: Option<&str>) -> Result<(), AppError> {
    match department {
        None => {
            for d in DEPARTMENTS {
                info!("{} ({})", d.name, d.slug());
            }
        }
        Some(slug) => {
            let d = find_department(slug).ok_or_else(|| AppError::UnknownDepartment(slug.to_string()))?;
            info!("{}:", d.name);
            for sub in d.subcategories {
                info!("  - {}", sub);
            }
        }
    }
    Ok(())
}

fn browse(config: &AppConfig, slug: &str, filter: ProductFilter) -> Result<(), AppError> {
    let subcategory = resolve_subcategory(slug);
    let storage = SqliteStorage::open_existing(&config.db_path)?;
    let products = filter.apply(storage.search_products(None, Some(&subcategory.db_category))?);

    info!("{}: {} products", subcategory.name, products.len());
    for p in &products {
        log_product(p);
    }
    Ok(())
}

fn deals(config: &AppConfig, limit: usize) -> Result<(), AppError> {
    let storage = SqliteStorage::open_existing(&config.db_path)?;
    let deals = find_deals(&storage.get_all_products()?);

    info!("{} deals found", deals.len());
    for d in deals.iter().take(limit) {
        info!(
            "{:>6.2}% {} at {}: {} (was {})",
            d.deal_percentage,
            d.product_name,
            d.store,
            format_price(Some(d.new_price)),
            format_price(Some(d.old_price))
        );
    }
    Ok(())
}

fn cart_totals(config: &AppConfig, cart: &Cart) -> Result<(), AppError> {
    let storage = SqliteStorage::open_existing(&config.db_path)?;

    let mut items = Vec::new();
    for item in cart.items() {
        let product = match storage.find_by_name(&item.product)? {
            Some(p) => Some(p),
            None => storage
                .search_products(Some(&item.product), None)?
                .into_iter()
                .next(),
        };
        match product {
            Some(p) => items.push((p, item.quantity)),
            None => warn!("Cart item not in catalog: {}", item.product),
        }
    }

    let comparison = compare_cart(&items);
    for (product, quantity) in &items {
        info!("{} x{}", product.name, quantity);
    }
    for (store, total) in &comparison.by_store {
        info!("  {}: {}", store, format_price(Some(*total)));
    }
    match comparison.best_store {
        Some(store) => info!(
            "Cheapest at {} ({}), saving up to {}",
            store,
            format_price(Some(comparison.best_price)),
            format_price(Some(comparison.max_savings))
        ),
        None => info!("No store prices available for this cart"),
    }
    if !comparison.has_all_stores {
        info!("Not every store carries items from this cart");
    }
    Ok(())
}

fn log_product(p: &Product) {
    let best = best_price(p);
    let prices = Store::ALL
        .iter()
        .map(|s| format!("{} {}", s, format_price(p.price_at(*s).current)))
        .collect::<Vec<_>>()
        .join(" | ");
    info!(
        "{} [{}] best: {}{}{}",
        p.name,
        p.category,
        format_price(best.map(|b| b.price)),
        best.and_then(|b| b.store)
            .map(|s| format!(" at {}", s))
            .unwrap_or_default(),
        if is_on_sale(p) {
            format!(" (up to {:.2}% off)", max_discount(p))
        } else {
            String::new()
        }
    );
    info!("  {}", prices);
}
