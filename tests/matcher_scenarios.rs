//! Matching behaviour on realistic catalog names and image folders.

use beiradar::config::MatcherConfig;
use beiradar::matcher::{CandidateMatcher, MatchMethod};

fn matcher(mappings: &[(&str, &str)]) -> CandidateMatcher {
    let config = MatcherConfig {
        manual_mappings: mappings
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ..MatcherConfig::default()
    };
    CandidateMatcher::new(&config, "images")
}

#[test]
fn test_manual_mapping_to_misspelled_file() {
    let m = matcher(&[("Daawat Long Grain 5kg", "dawaat lgrain 5kg")]);
    let files = ["daawat lgrain 2kg.jpg", "dawaat lgrain 5kg.jpg", "pishori 5kg.jpg"];

    let out = m.match_product("Daawat Long Grain 5kg", &files, false);
    assert_eq!(out.image.as_deref(), Some("images/dawaat lgrain 5kg.jpg"));
    assert_eq!(out.method, Some(MatchMethod::ManualExact));
}

#[test]
fn test_key_terms_contained_in_first_filename() {
    let m = matcher(&[]);
    let files = ["fresh milk 500ml.png", "strawberry milk 500ml.png"];

    let out = m.match_product("Fresh Milk 500ml", &files, false);
    assert_eq!(out.image.as_deref(), Some("images/fresh milk 500ml.png"));
}

#[test]
fn test_unmatchable_name_reports_no_match() {
    let m = matcher(&[]);
    let files = ["fresh milk 500ml.png", "strawberry milk 500ml.png", "omo 1kg.jpg"];

    let out = m.match_product("XyzUnmatchable!!!", &files, true);
    assert!(out.image.is_none());
    assert!(out.method.is_none());
    // no token overlap caps the score at the similarity weight
    assert!(out.trace.is_empty());
}

#[test]
fn test_manual_mapping_with_casing_and_spacing_noise() {
    let product = "Sunlight 2 in 1 Hand Washing Powder Lavender Sensations 500g";
    let m = matcher(&[(product, "sunlight 2 in 1 Lavender 500g")]);
    let files = ["sunlight lemon 1kg.jpg", "Sunlight  2-in-1_Lavender 500g.jpg"];

    let out = m.match_product(product, &files, false);
    assert_eq!(out.image.as_deref(), Some("images/Sunlight  2-in-1_Lavender 500g.jpg"));
}

#[test]
fn test_default_mappings_are_applied() {
    let m = CandidateMatcher::new(&MatcherConfig::default(), "images");
    let files = ["kleenex tpaper white 8pcs.jpg", "kleenex white 4pcs.jpg"];

    let out = m.match_product("Kleenex Toilet Paper Roll White 8pcs", &files, false);
    assert_eq!(out.image.as_deref(), Some("images/kleenex tpaper white 8pcs.jpg"));
}

#[test]
fn test_reflexive_on_verbatim_stems() {
    let m = matcher(&[]);
    let files = [
        "Brookside Whole Milk 1L.jpg",
        "Mumias Sugar 2kg.png",
        "Nice & Lovely Cocoa Butter 400ml.jpg",
        "Menengai Cream Bar 1kg.jpg",
    ];
    for file in files {
        let stem = file.rsplit_once('.').unwrap().0;
        let out = m.match_product(stem, &files, false);
        assert_eq!(out.image, Some(format!("images/{file}")), "product: {stem}");
    }
}

#[test]
fn test_word_order_does_not_matter_for_scoring() {
    let m = matcher(&[]);
    let files = ["5kg rice long grain pishori.jpg", "sugar 2kg.jpg"];

    let out = m.match_product("Pishori Long Grain Rice 5kg Bag", &files, false);
    assert_eq!(out.image.as_deref(), Some("images/5kg rice long grain pishori.jpg"));
    assert_eq!(out.method, Some(MatchMethod::Scored));
}

#[test]
fn test_custom_prefix() {
    let m = CandidateMatcher::new(&MatcherConfig::default(), "static/img/");
    let out = m.match_product("Omo 1kg", &["omo 1kg.jpg"], false);
    assert_eq!(out.image.as_deref(), Some("static/img/omo 1kg.jpg"));
}
