use crate::model::{Product, Store};
use serde::Serialize;

/// Cheapest current price across stores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestPrice {
    pub price: f64,
    /// `None` when every store charges the same, so no store stands out.
    pub store: Option<Store>,
}

/// Current prices that are present and non-zero, in store order.
pub fn valid_prices(product: &Product) -> Vec<(Store, f64)> {
    Store::ALL
        .iter()
        .filter_map(|s| {
            product
                .price_at(*s)
                .current
                .filter(|p| *p != 0.0)
                .map(|p| (*s, p))
        })
        .collect()
}

pub fn best_price(product: &Product) -> Option<BestPrice> {
    let prices = valid_prices(product);
    let (first_store, first_price) = *prices.first()?;

    let (store, price) = prices
        .iter()
        .skip(1)
        .fold((first_store, first_price), |best, &(s, p)| if p < best.1 { (s, p) } else { best });

    let all_same = prices.iter().all(|(_, p)| *p == price);
    Some(BestPrice {
        price,
        store: if all_same { None } else { Some(store) },
    })
}

/// Percentage off the original price at one store, rounded to 2 decimals.
pub fn store_discount(product: &Product, store: Store) -> f64 {
    round2(raw_discount(product, store))
}

/// Unrounded percentage off; filters compare against this.
fn raw_discount(product: &Product, store: Store) -> f64 {
    let quote = product.price_at(store);
    match (quote.current, quote.original) {
        (Some(current), Some(original)) if current != 0.0 && original > current => {
            (original - current) * 100.0 / original
        }
        _ => 0.0,
    }
}

/// Largest displayed (rounded) discount across stores.
pub fn max_discount(product: &Product) -> f64 {
    round2(max_raw_discount(product))
}

fn max_raw_discount(product: &Product) -> f64 {
    Store::ALL
        .iter()
        .map(|s| raw_discount(product, *s))
        .fold(0.0, f64::max)
}

pub fn is_on_sale(product: &Product) -> bool {
    max_discount(product) > 0.0
}

/// Post-query bounds on best price and discount.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_discount: Option<f64>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.min_price.is_none() && self.max_price.is_none() && self.min_discount.is_none()
    }

    /// Products without any price pass the price bounds.
    pub fn accepts(&self, product: &Product) -> bool {
        if let Some(best) = best_price(product) {
            if self.min_price.is_some_and(|min| best.price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| best.price > max) {
                return false;
            }
        }
        if let Some(min_discount) = self.min_discount {
            if max_raw_discount(product) < min_discount {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        if self.is_empty() {
            return products;
        }
        products.into_iter().filter(|p| self.accepts(p)).collect()
    }
}

/// Cross-store price gap on one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deal {
    pub product_name: String,
    pub weight: Option<String>,
    pub category: String,
    pub store: Store,
    pub old_price: f64,
    pub new_price: f64,
    pub deal_percentage: f64,
    pub image_url: Option<String>,
}

/// Products priced at two or more stores with a gap, biggest gap first.
pub fn find_deals(products: &[Product]) -> Vec<Deal> {
    let mut deals: Vec<Deal> = products
        .iter()
        .filter_map(|p| {
            let prices: Vec<(Store, f64)> =
                valid_prices(p).into_iter().filter(|(_, v)| *v > 0.0).collect();
            if prices.len() < 2 {
                return None;
            }
            let (store, low) = prices
                .iter()
                .skip(1)
                .fold(prices[0], |best, &(s, v)| if v < best.1 { (s, v) } else { best });
            let high = prices.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
            if high <= low {
                return None;
            }
            let pct = round2((high - low) * 100.0 / high);
            (pct > 0.0).then(|| Deal {
                product_name: p.name.clone(),
                weight: p.weight.clone(),
                category: display_category(&p.category),
                store,
                old_price: high,
                new_price: low,
                deal_percentage: pct,
                image_url: p.image_url.clone(),
            })
        })
        .collect();

    deals.sort_by(|a, b| b.deal_percentage.total_cmp(&a.deal_percentage));
    deals
}

/// `"paper_products"` -> `"Paper Products"`.
pub fn display_category(category: &str) -> String {
    title_case(&category.replace('_', " "))
}

/// Upper-cases every letter that follows a non-letter and lower-cases the rest,
/// so `"laundry/detergents"` becomes `"Laundry/Detergents"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if after_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    out
}

/// `KSh 1,234`, or `N/A` when there is no price.
pub fn format_price(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };
    // half-way cases go to the even neighbour
    let rounded = value.round_ties_even() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("KSh {}{}", sign, grouped)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
