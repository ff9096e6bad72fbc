//! Pipeline driver (design §4.10): orders every stage and assembles the
//! comprehensive summary.
//!
//! Fixed order: remove_duplicates -> standardize -> merge -> (optional)
//! remove outliers -> comprehensive summary.

use crate::blocking::{candidate_pairs, create_blocks, retain_blocks};
use crate::cluster::build_clusters;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::features::extract_all;
use crate::merge::merge_roster;
use crate::outliers::remove_outliers;
use crate::quality::{assess, QualityReport};
use crate::row::{Clusters, DupPairRecord, Pair, Row};
use crate::scoring::ScoreCache;
use crate::standardize::standardize;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Default)]
pub struct Summary(pub Map<String, Value>);

impl Summary {
    fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }
}

pub struct PipelineOutput {
    pub dup_pairs: Vec<DupPairRecord>,
    pub clusters: Clusters,
    pub summary: Summary,
    pub merged: Vec<Row>,
}

/// The expired-license statuses that count against compliance.
const EXPIRED_STATUSES: &[&str] = &["Expired", "Suspended", "Revoked", "Inactive"];

/// `(dup_pairs, clusters, initial_summary)` from the duplicate-detection
/// phase, plus the deduplicated roster (design §4.5 "Deduplicated
/// roster").
struct DetectionResult {
    dup_pairs: Vec<DupPairRecord>,
    clusters: Clusters,
    deduped: Vec<Row>,
    total_records: usize,
    candidate_pair_count: usize,
}

fn remove_duplicates(rows: &[Row], config: &PipelineConfig) -> DetectionResult {
    let features = extract_all(rows, config.ngram_n);
    let blocks = retain_blocks(create_blocks(&features), config.min_block, config.max_block);
    let pairs: Vec<Pair> = candidate_pairs(&blocks).into_iter().collect();

    if pairs.is_empty() {
        return DetectionResult {
            dup_pairs: Vec::new(),
            clusters: Clusters::new(),
            deduped: rows.to_vec(),
            total_records: rows.len(),
            candidate_pair_count: 0,
        };
    }

    let cache = ScoreCache::new();
    let score_one = |pair: &Pair| -> Option<DupPairRecord> {
        let score = cache.get_or_compute(*pair, &features[pair.i], &features[pair.j]);
        if score.total < config.threshold {
            return None;
        }
        Some(DupPairRecord {
            i1: pair.i,
            i2: pair.j,
            provider_id_1: rows[pair.i].provider_id.clone(),
            provider_id_2: rows[pair.j].provider_id.clone(),
            name_1: rows[pair.i].full_name.clone(),
            name_2: rows[pair.j].full_name.clone(),
            score: score.total,
            name_score: score.name_score,
            npi_match: score.npi_match,
            addr_score: score.addr_score,
            phone_match: score.phone_match,
            license_score: score.license_score,
        })
    };

    let mut accepted: Vec<DupPairRecord> = if config.parallel
        && pairs.len() > crate::config::PARALLEL_PAIR_THRESHOLD
    {
        use rayon::prelude::*;
        pairs
            .par_chunks(crate::config::PARALLEL_CHUNK_SIZE)
            .flat_map_iter(|chunk| chunk.iter().filter_map(score_one).collect::<Vec<_>>())
            .collect()
    } else {
        pairs.iter().filter_map(score_one).collect()
    };

    accepted.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    if accepted.is_empty() {
        return DetectionResult {
            dup_pairs: Vec::new(),
            clusters: Clusters::new(),
            deduped: rows.to_vec(),
            total_records: rows.len(),
            candidate_pair_count: pairs.len(),
        };
    }

    let clusters = build_clusters(&accepted, rows, &features);

    let mut keep: HashSet<usize> = (0..rows.len()).collect();
    for cluster in clusters.values() {
        for &member in &cluster.members {
            if member != cluster.representative {
                keep.remove(&member);
            }
        }
    }
    let mut keep_sorted: Vec<usize> = keep.into_iter().collect();
    keep_sorted.sort_unstable();
    let deduped: Vec<Row> = keep_sorted.into_iter().map(|idx| rows[idx].clone()).collect();

    DetectionResult {
        dup_pairs: accepted,
        clusters,
        deduped,
        total_records: rows.len(),
        candidate_pair_count: pairs.len(),
    }
}

/// Complete preprocessing pipeline with integrated summary creation.
pub fn preprocessing(
    roster: &[Row],
    base_path: &Path,
    remove_outliers_flag: bool,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let original = roster.to_vec();

    tracing::info!(rows = roster.len(), "starting dedup pass");
    let detection = remove_duplicates(roster, config);

    let unique_involved: HashSet<usize> = detection
        .dup_pairs
        .iter()
        .flat_map(|p| [p.i1, p.i2])
        .collect();

    tracing::info!(
        candidate_pairs = detection.candidate_pair_count,
        accepted = detection.dup_pairs.len(),
        clusters = detection.clusters.len(),
        "dedup pass complete"
    );

    let standardized = standardize(detection.deduped);

    tracing::info!(base_path = %base_path.display(), "merging roster against external tables");
    let merged = merge_roster(standardized, base_path)?;

    let (merged, outliers_removed) = if remove_outliers_flag {
        remove_outliers(
            merged,
            crate::config::YEARS_IN_PRACTICE_MIN,
            crate::config::YEARS_IN_PRACTICE_MAX,
        )
    } else {
        (merged, 0)
    };

    let mut summary = Summary::default();
    summary.set("total_records", detection.total_records as i64);
    summary.set("candidate_pairs", detection.candidate_pair_count as i64);
    summary.set("duplicate_pairs", detection.dup_pairs.len() as i64);
    summary.set("unique_involved", unique_involved.len() as i64);
    summary.set("clusters", detection.clusters.len() as i64);
    summary.set("outliers_removed", outliers_removed as i64);

    let quality = assess(&original, unique_involved.len());
    append_comprehensive_summary(&mut summary, &merged, &quality);

    tracing::info!(
        final_records = merged.len(),
        data_quality_score = quality.overall_score,
        "pipeline complete"
    );

    Ok(PipelineOutput {
        dup_pairs: detection.dup_pairs,
        clusters: detection.clusters,
        summary,
        merged,
    })
}

fn append_comprehensive_summary(summary: &mut Summary, merged: &[Row], quality: &QualityReport) {
    let final_records = merged.len();
    summary.set("final_records", final_records as i64);

    let expired_licenses = merged
        .iter()
        .filter(|r| {
            r.status
                .as_deref()
                .map(|s| EXPIRED_STATUSES.contains(&s))
                .unwrap_or(false)
        })
        .count();
    summary.set("expired_licenses", expired_licenses as i64);

    let missing_npi = merged
        .iter()
        .filter(|r| !r.npi_present.unwrap_or(false))
        .count();
    summary.set("missing_npi", missing_npi as i64);

    let providers_available = merged
        .iter()
        .filter(|r| r.accepting_new_patients.as_deref() == Some("Yes"))
        .count();
    summary.set("providers_available", providers_available as i64);

    let ca_state = merged
        .iter()
        .filter(|r| r.practice_state.as_deref() == Some("CA"))
        .count();
    let ny_state = merged
        .iter()
        .filter(|r| r.practice_state.as_deref() == Some("NY"))
        .count();
    summary.set("ca_state", ca_state as i64);
    summary.set("ny_state", ny_state as i64);

    summary.set("formatting_issues", quality.total_format_errors as i64);

    let compliance_rate = if final_records > 0 {
        let issues = (expired_licenses + missing_npi) as f64 / final_records as f64 * 100.0;
        (100.0 - issues).max(0.0)
    } else {
        100.0
    };
    summary.set("compliance_rate", round2(compliance_rate));
    summary.set("data_quality_score", quality.overall_score);
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
