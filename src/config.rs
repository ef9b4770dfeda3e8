use crate::model::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Tables and weights the normalizer and matcher are built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub abbreviations: HashMap<String, String>,
    pub stopwords: HashSet<String>,
    /// Exact product name -> filename fragment, curated by hand.
    pub manual_mappings: HashMap<String, String>,
    pub token_weight: f64,
    pub similarity_weight: f64,
    /// A scored candidate is accepted only when strictly above this.
    pub accept_threshold: f64,
    /// Candidates strictly above this show up in debug traces.
    pub debug_threshold: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            abbreviations: to_map(&[
                ("sberry", "strawberry"),
                ("nat", "natural"),
                ("mlk", "milk"),
                ("pcs", "pcs"),
                ("l", "liter"),
                ("kg", "kilogram"),
                ("g", "gram"),
                ("ltr", "liter"),
                ("tbsp", "tablespoon"),
                ("tsp", "teaspoon"),
                ("ml", "milliliter"),
                ("oz", "ounce"),
                ("fr", "fresh"),
                ("veg", "vegetable"),
                ("choc", "chocolate"),
                ("straw", "strawberry"),
                ("van", "vanilla"),
                ("lgrain", "long grain"),
            ]),
            stopwords: [
                "the", "a", "an", "and", "or", "of", "for", "with", "in", "hand", "washing",
                "powder",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            manual_mappings: to_map(&[
                ("Daawat Long Grain 5kg", "dawaat lgrain 5kg"),
                ("Daawat Long Grain 1Kg", "daawat lgrain 2kg"),
                (
                    "Sunlight 2 in 1 Hand Washing Powder Lavender Sensations 500g",
                    "sunlight 2 in 1 Lavender 500g",
                ),
                ("Kleenex Toilet Paper Roll White 8pcs", "kleenex tpaper white 8pcs"),
                ("Molped Sanitary Pads Ultra Soft 16pcs", "molped spads 16pcs"),
                ("Dabur Herbal Toothpaste Clove 150g", "dabur clove toothpaste 150g"),
                (
                    "Nice & Lovely Body Lotion Cocoa Butter 400ml",
                    "nice and lovely cocoa butter 400ml",
                ),
            ]),
            token_weight: 0.7,
            similarity_weight: 0.3,
            accept_threshold: 0.48,
            debug_threshold: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub image_folder: PathBuf,
    /// Prefix joined with the filename to form the stored image reference.
    pub image_url_prefix: String,
    pub report_path: Option<PathBuf>,
    pub matcher: MatcherConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("beiradar.db"),
            image_folder: PathBuf::from("static/images"),
            image_url_prefix: "images".to_string(),
            report_path: None,
            matcher: MatcherConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Loads `path` when it exists, falling back to built-in defaults otherwise.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(AppConfig::default())
    }
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
