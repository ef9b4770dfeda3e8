// Analyzer module: price comparison across stores, catalog browsing and the shopping cart.

pub mod cart;
pub mod catalog;
pub mod price_analysis;

pub use cart::{compare_cart, Cart, CartComparison};
pub use catalog::{build_suggestions, find_department, resolve_subcategory, Suggestion, DEPARTMENTS};
pub use price_analysis::{best_price, find_deals, format_price, BestPrice, Deal, ProductFilter};
