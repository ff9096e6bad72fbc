//! Roster merger (design §4.7): left-joins per state against external
//! license tables (CA, NY) and against an NPI registry table.

use crate::error::{PipelineError, Result};
use crate::normalize::{normalize_datetime, normalize_license};
use crate::row::Row;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CaRecord {
    license_number: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct NyRecord {
    license_number: String,
    expiration_date: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct NpiRecord {
    npi: String,
}

/// Reads an optional external CSV; `None` when the file is absent, which
/// is non-fatal per design §7.
fn read_optional_csv<T: for<'de> Deserialize<'de>>(
    path: &Path,
    table: &'static str,
) -> Result<Option<Vec<T>>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(path).map_err(|e| PipelineError::ExternalTableRead {
        table,
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut out = Vec::new();
    for record in reader.deserialize() {
        let record: T = record.map_err(|e| PipelineError::ExternalTableRead {
            table,
            path: path.to_path_buf(),
            source: e,
        })?;
        out.push(record);
    }
    Ok(Some(out))
}

/// Merges `rows` against `ca.csv`, `ny.csv`, `npi.csv` found under
/// `base_path`. All three are independently optional.
pub fn merge_roster(rows: Vec<Row>, base_path: &Path) -> Result<Vec<Row>> {
    let ca_records: Option<Vec<CaRecord>> =
        read_optional_csv(&base_path.join("ca.csv"), "ca")?;
    let ny_records: Option<Vec<NyRecord>> =
        read_optional_csv(&base_path.join("ny.csv"), "ny")?;
    let npi_records: Option<Vec<NpiRecord>> =
        read_optional_csv(&base_path.join("npi.csv"), "npi")?;

    let ca_index = ca_records
        .as_ref()
        .map(|records| build_ca_index(records, &base_path.join("ca.csv")))
        .transpose()?;
    let ny_index = ny_records
        .as_ref()
        .map(|records| build_ny_index(records, &base_path.join("ny.csv")))
        .transpose()?;
    let npi_set: HashSet<String> = npi_records
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| normalize_npi(&r.npi))
        .collect();

    let mut merged = Vec::with_capacity(rows.len());
    for mut row in rows {
        let license_norm = row
            .license_number
            .as_deref()
            .and_then(normalize_license);

        let status = match row.license_state.as_deref() {
            Some(state) if state.eq_ignore_ascii_case("CA") => {
                license_norm.as_deref().and_then(|k| ca_index.as_ref().and_then(|idx| idx.get(k)).cloned())
            }
            Some(state) if state.eq_ignore_ascii_case("NY") => {
                let exp_norm = row.license_expiration.as_deref().and_then(normalize_datetime);
                license_norm.as_deref().and_then(|k| {
                    ny_index.as_ref().and_then(|idx| idx.lookup(k, exp_norm))
                })
            }
            _ => None,
        };
        if let Some(status) = status {
            row.status = Some(status);
        }

        row.npi_present = Some(
            row.npi
                .as_deref()
                .and_then(normalize_npi)
                .map(|n| npi_set.contains(&n))
                .unwrap_or(false),
        );

        merged.push(row);
    }

    Ok(merged)
}

fn normalize_npi(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Builds the CA join index. Per design §4.7 the join must be many-to-one;
/// a repeated `license_number_norm` in the reference table is a corrupted
/// external table and is fatal (`JoinCardinalityViolation`), not silently
/// deduplicated.
fn build_ca_index(records: &[CaRecord], path: &Path) -> Result<HashMap<String, String>> {
    let mut index = HashMap::new();
    for rec in records {
        let Some(key) = normalize_license(&rec.license_number) else {
            continue;
        };
        if index.insert(key.clone(), rec.status.clone()).is_some() {
            return Err(PipelineError::JoinCardinalityViolation {
                table: "ca",
                path: path.to_path_buf(),
                key,
            });
        }
    }
    Ok(index)
}

struct NyIndex {
    by_key_and_date: HashMap<(String, chrono::NaiveDate), String>,
    by_key_only: HashMap<String, String>,
}

impl NyIndex {
    fn lookup(&self, key: &str, exp_norm: Option<chrono::NaiveDate>) -> Option<String> {
        if let Some(date) = exp_norm {
            self.by_key_and_date.get(&(key.to_string(), date)).cloned()
        } else {
            self.by_key_only.get(key).cloned()
        }
    }
}

/// Builds the NY join index on the declared join key
/// `(license_number_norm, expiration_date_norm)` for the date-aware join,
/// plus a first-occurrence-wins `license_number_norm`-only fallback for
/// rosters with no `license_expiration`. Only a repeated *composite* key
/// is a cardinality violation: the table legitimately carries one row per
/// license renewal (same number, different expiration), and the key-only
/// form is just a lossy fallback view over that, not an independently
/// declared join key.
fn build_ny_index(records: &[NyRecord], path: &Path) -> Result<NyIndex> {
    let mut by_key_and_date = HashMap::new();
    let mut by_key_only = HashMap::new();
    for rec in records {
        let Some(key) = normalize_license(&rec.license_number) else {
            continue;
        };
        if let Some(exp) = normalize_datetime(&rec.expiration_date) {
            if by_key_and_date
                .insert((key.clone(), exp), rec.status.clone())
                .is_some()
            {
                return Err(PipelineError::JoinCardinalityViolation {
                    table: "ny",
                    path: path.to_path_buf(),
                    key: format!("{key}@{exp}"),
                });
            }
        }
        by_key_only.entry(key).or_insert_with(|| rec.status.clone());
    }
    Ok(NyIndex {
        by_key_and_date,
        by_key_only,
    })
}
