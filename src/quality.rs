//! Quality assessor (design §4.9): six dimension scores plus an
//! unweighted mean, computed over the *original* pre-dedup roster.

use crate::normalize::{is_valid_npi, is_valid_zip_format, normalize_phone, normalize_zip, to_title};
use crate::row::Row;
use serde::Serialize;
use std::collections::HashSet;

const CRITICAL_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "npi",
    "license_number",
    "license_state",
    "credential",
    "practice_phone",
    "years_in_practice",
    "practice_city",
    "practice_address_line1",
];

const TITLE_COLS: &[&str] = &[
    "first_name",
    "last_name",
    "practice_city",
    "mailing_city",
    "practice_address_line1",
    "practice_address_line2",
    "mailing_address_line1",
    "mailing_address_line2",
    "medical_school",
    "residency_program",
];

const ACCEPTING_VALID_VALUES: &[&str] = &[
    "Yes", "No", "yes", "no", "YES", "NO", "Y", "N", "y", "n", "True", "False", "true", "false",
    "TRUE", "FALSE",
];

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub completeness_score: f64,
    pub validity_score: f64,
    pub total_format_errors: usize,
    pub consistency_score: f64,
    pub uniqueness_score: f64,
    pub accuracy_score: f64,
    pub unknown_values_score: f64,
    pub overall_score: f64,
}

fn field_present(row: &Row, field: &str) -> bool {
    match field {
        "years_in_practice" => row.years_in_practice.is_some(),
        other => row.field(other).is_some(),
    }
}

fn assess_completeness(rows: &[Row]) -> f64 {
    let mut total = 0usize;
    let mut filled = 0usize;
    for field in CRITICAL_FIELDS {
        for row in rows {
            total += 1;
            if field_present(row, field) {
                filled += 1;
            }
        }
    }
    if total == 0 {
        100.0
    } else {
        round2(filled as f64 / total as f64 * 100.0)
    }
}

fn assess_validity(rows: &[Row]) -> (f64, usize) {
    let mut valid = 0usize;
    let mut checked = 0usize;

    for row in rows {
        if let Some(npi) = &row.npi {
            checked += 1;
            if is_valid_npi(npi) {
                valid += 1;
            }
        }
    }
    for row in rows {
        if let Some(phone) = &row.practice_phone {
            checked += 1;
            if normalize_phone(phone).map(|d| d.len() == 10).unwrap_or(false) {
                valid += 1;
            }
        }
    }
    for zip_field in ["practice_zip", "mailing_zip"] {
        for row in rows {
            if let Some(z) = row.field(zip_field) {
                checked += 1;
                if normalize_zip(z).map(|n| is_valid_zip_format(&n)).unwrap_or(false) {
                    valid += 1;
                }
            }
        }
    }

    let score = if checked == 0 {
        100.0
    } else {
        round2(valid as f64 / checked as f64 * 100.0)
    };
    (score, checked - valid)
}

fn assess_consistency(rows: &[Row]) -> f64 {
    let mut consistent = 0usize;
    let mut checked = 0usize;

    for col in TITLE_COLS {
        for row in rows {
            if let Some(val) = row.field(col) {
                checked += 1;
                if val.trim() == to_title(val) {
                    consistent += 1;
                }
            }
        }
    }
    for row in rows {
        if let Some(phone) = &row.practice_phone {
            checked += 1;
            if phone.chars().all(|c| c.is_ascii_digit()) {
                consistent += 1;
            }
        }
    }

    if checked == 0 {
        100.0
    } else {
        round2(consistent as f64 / checked as f64 * 100.0)
    }
}

fn assess_uniqueness(rows: &[Row], unique_involved: usize) -> f64 {
    let total = rows.len();
    let mut unique = total as i64 - unique_involved as i64;

    let mut npi_seen: HashSet<&str> = HashSet::new();
    let mut npi_duplicates = 0usize;
    for row in rows {
        if let Some(npi) = row.npi.as_deref() {
            if !npi_seen.insert(npi) {
                npi_duplicates += 1;
            }
        }
    }
    unique -= npi_duplicates as i64;

    let mut license_seen: HashSet<(&str, &str)> = HashSet::new();
    let mut license_duplicates = 0usize;
    for row in rows {
        if let (Some(state), Some(number)) = (row.license_state.as_deref(), row.license_number.as_deref()) {
            if !license_seen.insert((state, number)) {
                license_duplicates += 1;
            }
        }
    }
    unique -= license_duplicates as i64;

    let unique = unique.max(0);
    if total == 0 {
        100.0
    } else {
        round2(unique as f64 / total as f64 * 100.0)
    }
}

fn assess_accuracy(rows: &[Row]) -> f64 {
    let mut accurate = 0usize;
    let mut checked = 0usize;
    for row in rows {
        if let Some(years) = row.years_in_practice {
            checked += 1;
            if (0..=60).contains(&years) {
                accurate += 1;
            }
        }
    }
    if checked == 0 {
        100.0
    } else {
        round2(accurate as f64 / checked as f64 * 100.0)
    }
}

fn assess_unknown_values(rows: &[Row]) -> f64 {
    let mut known = 0usize;
    let mut checked = 0usize;
    for row in rows {
        if let Some(val) = &row.accepting_new_patients {
            checked += 1;
            if ACCEPTING_VALID_VALUES.contains(&val.as_str()) {
                known += 1;
            }
        }
    }
    if checked == 0 {
        100.0
    } else {
        round2(known as f64 / checked as f64 * 100.0)
    }
}

/// Computes the full quality report over the original (pre-dedup) roster.
/// `unique_involved` is the count of rows flagged as duplicate-pair
/// endpoints, supplied by the pipeline driver.
pub fn assess(rows: &[Row], unique_involved: usize) -> QualityReport {
    let completeness_score = assess_completeness(rows);
    let (validity_score, total_format_errors) = assess_validity(rows);
    let consistency_score = assess_consistency(rows);
    let uniqueness_score = assess_uniqueness(rows, unique_involved);
    let accuracy_score = assess_accuracy(rows);
    let unknown_values_score = assess_unknown_values(rows);

    let overall_score = round2(
        (completeness_score
            + validity_score
            + consistency_score
            + uniqueness_score
            + accuracy_score
            + unknown_values_score)
            / 6.0,
    );

    QualityReport {
        completeness_score,
        validity_score,
        total_format_errors,
        consistency_score,
        uniqueness_score,
        accuracy_score,
        unknown_values_score,
        overall_score,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
