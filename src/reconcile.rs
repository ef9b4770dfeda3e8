// Reconciliation driver: assigns every catalog product its best image file.

use crate::matcher::{CandidateMatcher, CandidateScore, MatchMethod};
use crate::model::ReconcileError;
use crate::source::CandidateSource;
use crate::storage::CatalogStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchStatus {
    Matched {
        image: String,
        method: MatchMethod,
        rows_updated: usize,
    },
    Unmatched {
        trace: Vec<CandidateScore>,
    },
    /// The matcher found an image but writing it to the catalog failed.
    PersistFailed {
        image: String,
        method: MatchMethod,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileEntry {
    pub product: String,
    #[serde(flatten)]
    pub status: MatchStatus,
}

impl ReconcileEntry {
    /// The image chosen for this product, persisted or not.
    pub fn image(&self) -> Option<&str> {
        match &self.status {
            MatchStatus::Matched { image, .. } | MatchStatus::PersistFailed { image, .. } => {
                Some(image)
            }
            MatchStatus::Unmatched { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub persist_failed: usize,
    pub entries: Vec<ReconcileEntry>,
    /// Sorted image snapshot, listed only when something stayed unmatched.
    pub available_images: Vec<String>,
}

impl ReconcileReport {
    pub fn unmatched_entries(&self) -> impl Iterator<Item = &ReconcileEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, MatchStatus::Unmatched { .. }))
    }

    pub fn log_summary(&self) {
        info!("{}", "=".repeat(70));
        info!("SUMMARY:");
        info!("Total products: {}", self.total);
        info!("Matched: {}", self.matched);
        info!("Unmatched: {}", self.unmatched);
        if self.persist_failed > 0 {
            info!("Matched but not saved: {}", self.persist_failed);
        }
        info!("{}", "=".repeat(70));

        if self.unmatched == 0 {
            info!("All products matched successfully!");
            return;
        }

        info!("Products still needing manual review:");
        for entry in self.unmatched_entries() {
            info!(" - {}", entry.product);
            if let MatchStatus::Unmatched { trace } = &entry.status {
                info!("   Debug matches:");
                for c in trace {
                    info!(
                        "   {}: token_ratio={:.2}, string_sim={:.2}, score={:.2}",
                        c.file_name, c.token_ratio, c.string_similarity, c.score
                    );
                }
            }
        }

        info!("Available image files for reference:");
        for img in &self.available_images {
            info!("  - {}", img);
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

pub struct Reconciler {
    matcher: CandidateMatcher,
}

impl Reconciler {
    pub fn new(matcher: CandidateMatcher) -> Self {
        Self { matcher }
    }

    /// One full pass over the catalog. Fails before any write if the image
    /// snapshot or the product list cannot be read.
    pub fn run(
        &self,
        store: &mut dyn CatalogStore,
        source: &dyn CandidateSource,
    ) -> Result<ReconcileReport, ReconcileError> {
        let files = source.snapshot()?;
        let products = store.product_names()?;
        let candidates = self.matcher.prepare(&files);
        let total = products.len();

        info!(
            "Matching {} products against {} images...",
            total,
            candidates.len()
        );

        let mut entries = Vec::with_capacity(total);
        for (i, product) in products.into_iter().enumerate() {
            let outcome = self.matcher.find_best_image(&product, &candidates, false);

            let status = match (outcome.image, outcome.method) {
                (Some(image), Some(method)) => match store.set_image_url(&product, &image) {
                    Ok(rows_updated) => {
                        info!("✓ [{}/{}] Matched: {} → {}", i + 1, total, product, image);
                        MatchStatus::Matched {
                            image,
                            method,
                            rows_updated,
                        }
                    }
                    Err(e) => {
                        warn!("✗ [{}/{}] Not saved: {} → {}: {}", i + 1, total, product, image, e);
                        MatchStatus::PersistFailed {
                            image,
                            method,
                            error: e.to_string(),
                        }
                    }
                },
                _ => {
                    info!("✗ [{}/{}] No match: {}", i + 1, total, product);
                    let trace = self.matcher.find_best_image(&product, &candidates, true).trace;
                    MatchStatus::Unmatched { trace }
                }
            };

            entries.push(ReconcileEntry { product, status });
        }

        let count = |f: fn(&MatchStatus) -> bool| entries.iter().filter(|e| f(&e.status)).count();
        let matched = count(|s| matches!(s, MatchStatus::Matched { .. }));
        let unmatched = count(|s| matches!(s, MatchStatus::Unmatched { .. }));
        let persist_failed = count(|s| matches!(s, MatchStatus::PersistFailed { .. }));

        let available_images = if unmatched > 0 {
            let mut sorted = files;
            sorted.sort();
            sorted
        } else {
            Vec::new()
        };

        Ok(ReconcileReport {
            generated_at: Utc::now(),
            total,
            matched,
            unmatched,
            persist_failed,
            entries,
            available_images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatcherConfig;
    use crate::model::{SourceError, StorageError};
    use crate::source::FixedSource;
    use std::collections::HashMap;

    /// In-memory catalog that can be told to fail writes for chosen names.
    #[derive(Default)]
    struct MemoryCatalog {
        names: Vec<String>,
        urls: HashMap<String, String>,
        failing: Vec<String>,
        writes: usize,
    }

    impl CatalogStore for MemoryCatalog {
        fn product_names(&self) -> Result<Vec<String>, StorageError> {
            Ok(self.names.clone())
        }

        fn set_image_url(&mut self, product: &str, image_url: &str) -> Result<usize, StorageError> {
            if self.failing.iter().any(|f| f == product) {
                return Err(StorageError::NotFound("catalog went away".into()));
            }
            self.writes += 1;
            self.urls.insert(product.to_string(), image_url.to_string());
            Ok(self.names.iter().filter(|n| *n == product).count())
        }

        fn image_urls_for(&self, product: &str) -> Result<Vec<String>, StorageError> {
            Ok(self.urls.get(product).cloned().into_iter().collect())
        }
    }

    struct BrokenSource;

    impl CandidateSource for BrokenSource {
        fn snapshot(&self) -> Result<Vec<String>, SourceError> {
            Err(SourceError::FolderNotFound("static/images".into()))
        }
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(CandidateMatcher::new(&MatcherConfig::default(), "images"))
    }

    fn catalog(names: &[&str]) -> MemoryCatalog {
        MemoryCatalog {
            names: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tri_state_report() {
        let mut store = catalog(&["Fresh Milk 500ml", "Omo 1kg", "XyzUnmatchable!!!"]);
        store.failing.push("Omo 1kg".into());
        let source = FixedSource::new(["omo 1kg.jpg", "fresh milk 500ml.png"]);

        let report = reconciler().run(&mut store, &source).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.matched, 1);
        assert_eq!(report.persist_failed, 1);
        assert_eq!(report.unmatched, 1);
        assert!(matches!(report.entries[1].status, MatchStatus::PersistFailed { .. }));
        assert_eq!(report.entries[1].image(), Some("images/omo 1kg.jpg"));
        assert_eq!(
            store.image_urls_for("Fresh Milk 500ml").unwrap(),
            vec!["images/fresh milk 500ml.png"]
        );
        assert!(store.image_urls_for("Omo 1kg").unwrap().is_empty());
        assert_eq!(
            report.available_images,
            vec!["fresh milk 500ml.png", "omo 1kg.jpg"]
        );
    }

    #[test]
    fn test_snapshot_failure_aborts_before_writes() {
        let mut store = catalog(&["Fresh Milk 500ml"]);
        let result = reconciler().run(&mut store, &BrokenSource);
        assert!(matches!(result, Err(ReconcileError::Source(_))));
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn test_all_matched_has_no_image_listing() {
        let mut store = catalog(&["Fresh Milk 500ml"]);
        let source = FixedSource::new(["fresh milk 500ml.png"]);
        let report = reconciler().run(&mut store, &source).unwrap();
        assert_eq!(report.unmatched, 0);
        assert!(report.available_images.is_empty());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut store = catalog(&["Daawat Long Grain 5kg", "Fresh Milk 500ml"]);
        let source = FixedSource::new(["dawaat lgrain 5kg.jpg", "fresh milk 500ml.png"]);
        let r = reconciler();

        let first = r.run(&mut store, &source).unwrap();
        let second = r.run(&mut store, &source).unwrap();
        assert_eq!(first.entries, second.entries);
    }

    #[test]
    fn test_report_serializes_status_tag() {
        let mut store = catalog(&["XyzUnmatchable!!!"]);
        let source = FixedSource::new(["omo 1kg.jpg"]);
        let report = reconciler().run(&mut store, &source).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["product"], "XyzUnmatchable!!!");
        assert_eq!(json["entries"][0]["status"], "unmatched");
        assert!(json["entries"][0]["trace"].as_array().unwrap().is_empty());
    }
}
