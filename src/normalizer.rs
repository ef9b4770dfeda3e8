use crate::config::MatcherConfig;
use std::collections::{HashMap, HashSet};

/// Byte sequence an en-dash turns into after a UTF-8 -> cp1252 round trip.
const MISENCODED_EN_DASH: &str = "â€“";

/// Text normalizer for catalog names and image filename stems.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    abbreviations: HashMap<String, String>,
    stopwords: HashSet<String>,
}

impl TextNormalizer {
    pub fn new(abbreviations: HashMap<String, String>, stopwords: HashSet<String>) -> Self {
        Self {
            abbreviations,
            stopwords,
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.abbreviations.clone(), config.stopwords.clone())
    }

    /// Lower-cases, strips punctuation and expands abbreviations.
    pub fn normalize(&self, text: &str) -> String {
        let text = text
            .to_lowercase()
            .replace('-', " ")
            .replace(MISENCODED_EN_DASH, " ")
            .replace('_', " ")
            .replace('&', "and");

        let cleaned: String = text
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
            .collect();

        cleaned
            .split_whitespace()
            .map(|token| {
                self.abbreviations
                    .get(token)
                    .map(String::as_str)
                    .unwrap_or(token)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Normalized tokens minus stopwords and single-character tokens, in order.
    pub fn key_terms(&self, text: &str) -> Vec<String> {
        self.normalize(text)
            .split_whitespace()
            .filter(|t| !self.stopwords.contains(*t) && t.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::from_config(&MatcherConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation_and_case() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("Nice & Lovely Body-Lotion"), "nice and lovely body lotion");
        assert_eq!(n.normalize("Brookside_Milk!!!"), "brookside milk");
        assert_eq!(n.normalize("Tissue â€“ Soft"), "tissue soft");
    }

    #[test]
    fn test_normalize_expands_abbreviations() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("Dawaat LGrain 5kg"), "dawaat long grain 5kg");
        assert_eq!(n.normalize("choc mlk 500 ml"), "chocolate milk 500 milliliter");
        assert_eq!(n.normalize("Oil 1 L"), "oil 1 liter");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let n = TextNormalizer::default();
        for input in [
            "Daawat Long Grain 5kg",
            "dawaat lgrain 5kg",
            "Sunlight 2 in 1 Hand Washing Powder Lavender Sensations 500g",
            "Van & Straw Yoghurt 1 l",
            "  --__ ",
            "Kleenex T-Paper (White) 8pcs",
        ] {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_normalize_empty_input() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("!!!"), "");
        assert_eq!(n.normalize(""), "");
    }

    #[test]
    fn test_key_terms_drop_stopwords_and_short_tokens() {
        let n = TextNormalizer::default();
        assert_eq!(
            n.key_terms("Sunlight 2 in 1 Hand Washing Powder Lavender Sensations 500g"),
            vec!["sunlight", "lavender", "sensations", "500g"]
        );
        assert_eq!(n.key_terms("Fresh Milk 500ml"), vec!["fresh", "milk", "500ml"]);
        assert!(n.key_terms("The & of a").is_empty());
    }

    #[test]
    fn test_custom_tables_are_used() {
        let n = TextNormalizer::new(
            [("tp".to_string(), "toilet paper".to_string())].into_iter().collect(),
            ["roll".to_string()].into_iter().collect(),
        );
        assert_eq!(n.normalize("Kleenex TP Roll"), "kleenex toilet paper roll");
        assert_eq!(n.key_terms("Kleenex TP Roll"), vec!["kleenex", "toilet", "paper"]);
    }
}
