//! Pair scorer (design §4.4).
//!
//! Five weighted signals with a cheap early-exit gate. Scores are
//! memoized per `(min(i,j), max(i,j))` for the duration of one detection
//! run; the cache is per-invocation, not shared across worker-pool
//! threads (chunk-local hits only, per the design's concurrency model).

use crate::config::EARLY_EXIT_TOKEN_THRESHOLD;
use crate::row::{DerivedFeatures, Pair, PairScore};
use crate::similarity::{jaccard, phone_match_digits, token_overlap};
use std::collections::HashMap;
use std::sync::Mutex;

const WEIGHT_NAME: f64 = 0.27;
const WEIGHT_NPI: f64 = 0.0;
const WEIGHT_ADDR: f64 = 0.08;
const WEIGHT_PHONE: f64 = 0.50;
const WEIGHT_LICENSE: f64 = 0.15;

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Scores a single pair from its derived features. No caching; callers
/// that need memoization use [`ScoreCache`].
pub fn score_pair(ri: &DerivedFeatures, rj: &DerivedFeatures) -> PairScore {
    let name_tok = token_overlap(&ri.clean_name, &rj.clean_name);
    let both_have_npi = !ri.npi_key.is_empty() && !rj.npi_key.is_empty();
    let phone_hit = phone_match_digits(&ri.phone_digits, &rj.phone_digits);

    if name_tok < EARLY_EXIT_TOKEN_THRESHOLD && !both_have_npi && phone_hit == 0.0 {
        return PairScore {
            total: 0.0,
            name_score: round4(name_tok),
            npi_match: false,
            addr_score: 0.0,
            phone_match: false,
            license_score: 0.0,
        };
    }

    let name_big = jaccard(&ri.name_grams, &rj.name_grams);
    let name_score = name_tok.max(name_big);
    let npi_match = both_have_npi && ri.npi_key == rj.npi_key;
    let addr_score = jaccard(&ri.addr_grams, &rj.addr_grams);
    let phone_match = phone_hit != 0.0;

    let license_score = license_score(&ri.license_key, &rj.license_key);

    let total = name_score * WEIGHT_NAME
        + (if npi_match { 1.0 } else { 0.0 }) * WEIGHT_NPI
        + addr_score * WEIGHT_ADDR
        + phone_hit * WEIGHT_PHONE
        + license_score * WEIGHT_LICENSE;

    PairScore {
        total: round4(total),
        name_score: round4(name_score),
        npi_match,
        addr_score: round4(addr_score),
        phone_match,
        license_score: round4(license_score),
    }
}

fn license_score(lic_i: &str, lic_j: &str) -> f64 {
    if !lic_i.is_empty() && !lic_j.is_empty() && lic_i == lic_j && lic_i != "|" {
        return 1.0;
    }
    let state_i = lic_i.split('|').next().unwrap_or("");
    let state_j = lic_j.split('|').next().unwrap_or("");
    if !state_i.is_empty() && state_i == state_j {
        return 0.5;
    }
    0.0
}

/// Per-invocation memoization of pair scores.
pub struct ScoreCache {
    cache: Mutex<HashMap<Pair, PairScore>>,
}

impl ScoreCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_compute(
        &self,
        pair: Pair,
        ri: &DerivedFeatures,
        rj: &DerivedFeatures,
    ) -> PairScore {
        if let Some(score) = self.cache.lock().expect("cache lock poisoned").get(&pair) {
            return *score;
        }
        let score = score_pair(ri, rj);
        self.cache.lock().expect("cache lock poisoned").insert(pair, score);
        score
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new()
    }
}
