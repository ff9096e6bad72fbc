//! End-to-end exercise of `preprocessing` over a small synthetic roster,
//! covering the seed scenarios from spec.md §8.

use pretty_assertions::assert_eq;
use provider_roster::{preprocessing, PipelineConfig, Row};
use std::io::Write;

fn row(
    provider_id: &str,
    first: &str,
    last: &str,
    npi: &str,
    phone: &str,
    addr: &str,
    license_state: &str,
    license_number: &str,
    last_updated: &str,
) -> Row {
    Row {
        provider_id: Some(provider_id.to_string()),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        full_name: Some(format!("{first} {last}")),
        npi: Some(npi.to_string()),
        practice_phone: Some(phone.to_string()),
        practice_address_line1: Some(addr.to_string()),
        practice_city: Some("San Francisco".to_string()),
        practice_state: Some("CA".to_string()),
        practice_zip: Some("94110".to_string()),
        license_state: Some(license_state.to_string()),
        license_number: Some(license_number.to_string()),
        years_in_practice: Some(12),
        last_updated: Some(last_updated.to_string()),
        accepting_new_patients: Some("Yes".to_string()),
        ..Default::default()
    }
}

fn tmp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "provider_roster_integration_{name}_{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn exact_npi_twin_clusters_and_keeps_newer_representative() {
    let rows = vec![
        row(
            "1", "Ada", "Lovelace", "1234567890", "(415) 555-0100", "1 Main St", "CA", "A-1",
            "2023-01-01",
        ),
        row(
            "2", "Ada", "Lovelace", "1234567890", "(415) 555-0100", "2 Other St", "CA", "A-1",
            "2024-06-01",
        ),
        row(
            "3", "Bob", "Jones", "9999999999", "(212) 555-0000", "99 Side Ave", "CA", "B-9",
            "2022-01-01",
        ),
    ];

    let base_path = tmp_dir("npi_twin");
    let config = PipelineConfig::default();
    let output = preprocessing(&rows, &base_path, true, &config).expect("pipeline succeeds");

    assert_eq!(output.dup_pairs.len(), 1);
    let pair = &output.dup_pairs[0];
    assert!(pair.npi_match);
    assert!(pair.phone_match);
    assert_eq!(pair.license_score, 1.0);
    assert!((pair.score - 0.92).abs() < 0.02);

    assert_eq!(output.clusters.len(), 1);
    let cluster = output.clusters.values().next().unwrap();
    assert_eq!(cluster.members, vec![0, 1]);
    // Row 1 (index 1) has the later last_updated and wins the representative slot.
    assert_eq!(cluster.representative, 1);

    // Representative (row index 1) plus the untouched singleton (row index 2).
    assert_eq!(output.merged.len(), 2);
    assert_eq!(output.summary.0["duplicate_pairs"], 1);
    assert_eq!(output.summary.0["clusters"], 1);
}

#[test]
fn preprocessing_is_deterministic_across_runs() {
    let rows = vec![
        row(
            "1", "Ada", "Lovelace", "1234567890", "4155550100", "1 Main St", "CA", "A-1",
            "2023-01-01",
        ),
        row(
            "2", "Ada", "Lovelace", "1234567890", "4155550100", "2 Other St", "CA", "A-1",
            "2024-06-01",
        ),
    ];
    let base_path = tmp_dir("determinism");
    let config = PipelineConfig::default();

    let first = preprocessing(&rows, &base_path, true, &config).unwrap();
    let second = preprocessing(&rows, &base_path, true, &config).unwrap();

    assert_eq!(first.dup_pairs.len(), second.dup_pairs.len());
    for (a, b) in first.dup_pairs.iter().zip(second.dup_pairs.iter()) {
        assert_eq!(a.score, b.score);
        assert_eq!(a.i1, b.i1);
        assert_eq!(a.i2, b.i2);
    }
    assert_eq!(first.clusters.keys().collect::<Vec<_>>(), second.clusters.keys().collect::<Vec<_>>());
    for key in first.clusters.keys() {
        assert_eq!(first.clusters[key].representative, second.clusters[key].representative);
    }
}

#[test]
fn external_ca_table_enriches_status_and_npi_table_flags_presence() {
    let base_path = tmp_dir("external_merge");
    let mut f = std::fs::File::create(base_path.join("ca.csv")).unwrap();
    writeln!(f, "license_number,status").unwrap();
    writeln!(f, "A1,Active").unwrap();
    drop(f);

    let mut f = std::fs::File::create(base_path.join("npi.csv")).unwrap();
    writeln!(f, "npi").unwrap();
    writeln!(f, "1234567890").unwrap();
    drop(f);

    let rows = vec![row(
        "1", "Ada", "Lovelace", "1234567890", "4155550100", "1 Main St", "CA", "A-1",
        "2023-01-01",
    )];
    let config = PipelineConfig::default();
    let output = preprocessing(&rows, &base_path, true, &config).unwrap();

    assert_eq!(output.merged[0].status.as_deref(), Some("Active"));
    assert_eq!(output.merged[0].npi_present, Some(true));
}

#[test]
fn empty_roster_yields_zero_counts() {
    let base_path = tmp_dir("empty");
    let config = PipelineConfig::default();
    let output = preprocessing(&[], &base_path, true, &config).unwrap();

    assert!(output.dup_pairs.is_empty());
    assert!(output.clusters.is_empty());
    assert!(output.merged.is_empty());
    assert_eq!(output.summary.0["total_records"], 0);
    assert_eq!(output.summary.0["candidate_pairs"], 0);
}
