use crate::analyzer::price_analysis::{display_category, title_case};
use crate::model::Product;
use serde::Serialize;
use std::collections::HashSet;

/// Top-level shelf grouping, each holding a few subcategories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Department {
    pub name: &'static str,
    pub subcategories: &'static [&'static str],
}

impl Department {
    pub fn slug(&self) -> String {
        slugify(self.name)
    }
}

pub const DEPARTMENTS: &[Department] = &[
    Department {
        name: "Foodstuff",
        subcategories: &["Rice", "Cooking Oil", "Sugar"],
    },
    Department {
        name: "Dairy",
        subcategories: &["Milk", "Yoghurt", "Cheese"],
    },
    Department {
        name: "Household",
        subcategories: &["Laundry", "Dishwashing", "Paper products"],
    },
    Department {
        name: "Personal Care",
        subcategories: &["Toothpastes", "Lotion", "Sanitary Pads"],
    },
];

/// Subcategories whose catalog category is named differently.
const CATEGORY_ALIASES: &[(&str, &str)] = &[("Cooking Oil", "Oil")];

/// `"Personal Care"` -> `"personal-care"`.
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

pub fn find_department(slug: &str) -> Option<&'static Department> {
    DEPARTMENTS.iter().find(|d| d.slug() == slug)
}

/// A subcategory slug resolved to its display name and the catalog category
/// to query for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subcategory {
    pub name: String,
    pub db_category: String,
}

pub fn resolve_subcategory(slug: &str) -> Subcategory {
    let name = title_case(&slug.replace('-', " "));
    let db_category = CATEGORY_ALIASES
        .iter()
        .find(|(sub, _)| *sub == name)
        .map(|(_, cat)| cat.to_string())
        .unwrap_or_else(|| name.clone());
    Subcategory { name, db_category }
}

pub const MIN_SUGGESTION_QUERY: usize = 2;
pub const MAX_PRODUCT_SUGGESTIONS: usize = 10;
pub const MAX_SUGGESTIONS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Product,
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

/// The trimmed, lower-cased query, or `None` when it is too short to suggest for.
pub fn suggestion_query(raw: &str) -> Option<String> {
    let query = raw.trim().to_lowercase();
    (query.chars().count() >= MIN_SUGGESTION_QUERY).then_some(query)
}

/// Autocomplete entries: product names from the first search hits, then
/// matching categories in display form. Duplicates are dropped case-insensitively.
pub fn build_suggestions(products: &[Product], categories: &[String]) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    let mut suggestions = Vec::new();

    for product in products.iter().take(MAX_PRODUCT_SUGGESTIONS) {
        let name = product.name.trim();
        if !name.is_empty() && seen.insert(name.to_lowercase()) {
            suggestions.push(Suggestion {
                text: name.to_string(),
                kind: SuggestionKind::Product,
            });
        }
    }

    for category in categories {
        let text = display_category(category);
        if seen.insert(text.to_lowercase()) {
            suggestions.push(Suggestion {
                text,
                kind: SuggestionKind::Category,
            });
        }
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Product {
        Product {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_department_slugs() {
        let slugs: Vec<String> = DEPARTMENTS.iter().map(Department::slug).collect();
        assert_eq!(slugs, vec!["foodstuff", "dairy", "household", "personal-care"]);

        let care = find_department("personal-care").unwrap();
        assert_eq!(care.name, "Personal Care");
        assert_eq!(care.subcategories[0], "Toothpastes");
        assert!(find_department("Personal Care").is_none());
    }

    #[test]
    fn test_resolve_subcategory() {
        let oil = resolve_subcategory("cooking-oil");
        assert_eq!(oil.name, "Cooking Oil");
        assert_eq!(oil.db_category, "Oil");

        let paper = resolve_subcategory(&slugify("Paper products"));
        assert_eq!(paper.name, "Paper Products");
        assert_eq!(paper.db_category, "Paper Products");

        assert_eq!(resolve_subcategory("laundry/detergents").name, "Laundry/Detergents");
    }

    #[test]
    fn test_suggestion_query_needs_two_chars() {
        assert_eq!(suggestion_query("  M "), None);
        assert_eq!(suggestion_query(""), None);
        assert_eq!(suggestion_query(" MIlk "), Some("milk".to_string()));
    }

    #[test]
    fn test_suggestions_products_then_categories() {
        let products = vec![named("Brookside Milk"), named(" brookside milk "), named("Fresh Milk")];
        let categories = vec!["milk".to_string(), "milk_powder".to_string()];

        let suggestions = build_suggestions(&products, &categories);
        let texts: Vec<&str> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Brookside Milk", "Fresh Milk", "Milk", "Milk Powder"]);
        assert_eq!(suggestions[1].kind, SuggestionKind::Product);
        assert_eq!(suggestions[2].kind, SuggestionKind::Category);
    }

    #[test]
    fn test_suggestions_category_equal_to_product_is_dropped() {
        let suggestions = build_suggestions(&[named("Sugar")], &["sugar".to_string()]);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Product);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let products: Vec<Product> = (0..15).map(|i| named(&format!("Rice {}", i))).collect();
        let categories: Vec<String> = (0..5).map(|i| format!("rice_grain_{}", i)).collect();

        let suggestions = build_suggestions(&products, &categories);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        let product_count = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::Product)
            .count();
        assert_eq!(product_count, MAX_PRODUCT_SUGGESTIONS);
        assert_eq!(suggestions[11].text, "Rice Grain 1");
    }

    #[test]
    fn test_suggestion_serializes_with_type_tag() {
        let s = Suggestion {
            text: "Milk".to_string(),
            kind: SuggestionKind::Category,
        };
        assert_eq!(
            serde_json::to_string(&s).unwrap(),
            r#"{"text":"Milk","type":"category"}"#
        );
    }
}
