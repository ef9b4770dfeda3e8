// Candidate matcher: picks the most plausible image file for a product name.

pub mod similarity;

use crate::config::MatcherConfig;
use crate::normalizer::TextNormalizer;
use serde::Serialize;
use similarity::similarity_ratio;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Which resolution step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ManualExact,
    ManualContains,
    Exact,
    Subset,
    Scored,
}

/// Component scores of one candidate, reported for triage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub file_name: String,
    pub token_ratio: f64,
    pub string_similarity: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub image: Option<String>,
    pub method: Option<MatchMethod>,
    /// Candidates above the debug threshold; empty unless debug was requested.
    pub trace: Vec<CandidateScore>,
}

impl MatchOutcome {
    fn found(image: String, method: MatchMethod) -> Self {
        Self {
            image: Some(image),
            method: Some(method),
            trace: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.image.is_some()
    }
}

/// One image filename with its normalized forms, computed once per snapshot.
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub file_name: String,
    pub normalized_stem: String,
    pub key_terms: Vec<String>,
}

/// Filename without its final extension, the way `os.path.splitext` sees it.
pub fn file_stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

pub struct CandidateMatcher {
    normalizer: TextNormalizer,
    manual_mappings: HashMap<String, String>,
    image_url_prefix: String,
    token_weight: f64,
    similarity_weight: f64,
    accept_threshold: f64,
    debug_threshold: f64,
}

impl CandidateMatcher {
    pub fn new(config: &MatcherConfig, image_url_prefix: &str) -> Self {
        Self {
            normalizer: TextNormalizer::from_config(config),
            manual_mappings: config.manual_mappings.clone(),
            image_url_prefix: image_url_prefix.trim_end_matches('/').to_string(),
            token_weight: config.token_weight,
            similarity_weight: config.similarity_weight,
            accept_threshold: config.accept_threshold,
            debug_threshold: config.debug_threshold,
        }
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Normalizes a snapshot of filenames, keeping enumeration order.
    pub fn prepare<S: AsRef<str>>(&self, file_names: &[S]) -> Vec<ImageCandidate> {
        file_names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let stem = file_stem(name);
                ImageCandidate {
                    file_name: name.to_string(),
                    normalized_stem: self.normalizer.normalize(stem),
                    key_terms: self.normalizer.key_terms(stem),
                }
            })
            .collect()
    }

    /// Convenience wrapper over [`find_best_image`](Self::find_best_image) for raw filenames.
    pub fn match_product<S: AsRef<str>>(
        &self,
        product_name: &str,
        file_names: &[S],
        debug: bool,
    ) -> MatchOutcome {
        let candidates = self.prepare(file_names);
        self.find_best_image(product_name, &candidates, debug)
    }

    pub fn find_best_image(
        &self,
        product_name: &str,
        candidates: &[ImageCandidate],
        debug: bool,
    ) -> MatchOutcome {
        if let Some(found) = self.manual_override(product_name, candidates) {
            return found;
        }

        let product_clean = self.normalizer.normalize(product_name);
        if product_clean.is_empty() {
            return MatchOutcome::default();
        }

        if let Some(img) = candidates
            .iter()
            .find(|c| c.normalized_stem == product_clean)
        {
            return MatchOutcome::found(self.reference(&img.file_name), MatchMethod::Exact);
        }

        let product_terms = self.normalizer.key_terms(product_name);
        if !product_terms.is_empty() {
            if let Some(img) = candidates.iter().find(|c| {
                product_terms
                    .iter()
                    .all(|t| c.normalized_stem.contains(t.as_str()))
            }) {
                return MatchOutcome::found(self.reference(&img.file_name), MatchMethod::Subset);
            }
        }

        let mut outcome = MatchOutcome::default();
        let mut best: Option<(&ImageCandidate, f64)> = None;

        for img in candidates {
            let scored = self.score_candidate(&product_clean, &product_terms, img);

            if best.is_none_or(|(_, top)| scored.score > top) {
                best = Some((img, scored.score));
            }
            if debug && scored.score > self.debug_threshold {
                debug!(
                    "  {}: token_ratio={:.2}, string_sim={:.2}, score={:.2}",
                    file_stem(&img.file_name),
                    scored.token_ratio,
                    scored.string_similarity,
                    scored.score
                );
                outcome.trace.push(scored);
            }
        }

        if let Some((img, score)) = best {
            if score > self.accept_threshold {
                outcome.image = Some(self.reference(&img.file_name));
                outcome.method = Some(MatchMethod::Scored);
            }
        }

        outcome
    }

    /// Weighted token-overlap and string-similarity score for one candidate.
    pub fn score_candidate(
        &self,
        product_clean: &str,
        product_terms: &[String],
        img: &ImageCandidate,
    ) -> CandidateScore {
        let shared = product_terms
            .iter()
            .filter(|t| img.key_terms.contains(t))
            .count();
        let token_ratio = shared as f64 / product_terms.len().max(1) as f64;
        let string_similarity = similarity_ratio(product_clean, &img.normalized_stem);

        CandidateScore {
            file_name: img.file_name.clone(),
            token_ratio,
            string_similarity,
            score: token_ratio * self.token_weight + string_similarity * self.similarity_weight,
        }
    }

    fn manual_override(
        &self,
        product_name: &str,
        candidates: &[ImageCandidate],
    ) -> Option<MatchOutcome> {
        let target = self.manual_mappings.get(product_name)?;
        let target = self.normalizer.normalize(target);
        if target.is_empty() {
            return None;
        }

        if let Some(img) = candidates.iter().find(|c| c.normalized_stem == target) {
            return Some(MatchOutcome::found(
                self.reference(&img.file_name),
                MatchMethod::ManualExact,
            ));
        }

        let img = candidates.iter().find(|c| {
            !c.normalized_stem.is_empty()
                && (c.normalized_stem.contains(&target) || target.contains(&c.normalized_stem))
        })?;
        Some(MatchOutcome::found(
            self.reference(&img.file_name),
            MatchMethod::ManualContains,
        ))
    }

    fn reference(&self, file_name: &str) -> String {
        if self.image_url_prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", self.image_url_prefix, file_name)
        }
    }
}
