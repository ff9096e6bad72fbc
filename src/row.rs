//! Data model (design §3): `Row`, `DerivedFeatures`, `Pair`, `PairScore`,
//! `Cluster`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// A provider record. All semantic fields are optional strings except
/// `npi_present`, which is derived during the merge stage, and
/// `years_in_practice`, which is a bounded integer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub provider_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub npi: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub credential: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub primary_specialty: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub practice_address_line1: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub practice_address_line2: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub practice_city: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub practice_state: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub practice_zip: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub practice_phone: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub mailing_address_line1: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub mailing_address_line2: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub mailing_city: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub mailing_state: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub mailing_zip: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub mailing_phone: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub license_number: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub license_state: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub license_expiration: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub accepting_new_patients: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub board_certified: Option<String>,
    #[serde(default)]
    pub years_in_practice: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub medical_school: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub residency_program: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub last_updated: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub taxonomy_code: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub npi_present: Option<bool>,
}

impl Row {
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "first_name" => self.first_name.as_deref(),
            "last_name" => self.last_name.as_deref(),
            "npi" => self.npi.as_deref(),
            "license_number" => self.license_number.as_deref(),
            "license_state" => self.license_state.as_deref(),
            "credential" => self.credential.as_deref(),
            "practice_phone" => self.practice_phone.as_deref(),
            "practice_city" => self.practice_city.as_deref(),
            "practice_address_line1" => self.practice_address_line1.as_deref(),
            "practice_zip" => self.practice_zip.as_deref(),
            "mailing_zip" => self.mailing_zip.as_deref(),
            "mailing_city" => self.mailing_city.as_deref(),
            "practice_address_line2" => self.practice_address_line2.as_deref(),
            "mailing_address_line1" => self.mailing_address_line1.as_deref(),
            "mailing_address_line2" => self.mailing_address_line2.as_deref(),
            "medical_school" => self.medical_school.as_deref(),
            "residency_program" => self.residency_program.as_deref(),
            _ => None,
        }
    }
}

/// Per-row features computed once at ingestion (design §3).
#[derive(Debug, Clone, Default)]
pub struct DerivedFeatures {
    pub clean_name: String,
    pub first_clean: String,
    pub last_clean: String,
    pub name_grams: HashSet<String>,
    pub addr_text: String,
    pub addr_grams: HashSet<String>,
    pub phone_digits: String,
    pub npi_key: String,
    pub license_key: String,
    pub city_state_key: String,
    pub name_key: String,
    pub zip3: String,
}

/// Unordered pair of row indices, `i < j` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pair {
    pub i: usize,
    pub j: usize,
}

impl Pair {
    pub fn new(a: usize, b: usize) -> Self {
        if a < b {
            Pair { i: a, j: b }
        } else {
            Pair { i: b, j: a }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub total: f64,
    pub name_score: f64,
    pub npi_match: bool,
    pub addr_score: f64,
    pub phone_match: bool,
    pub license_score: f64,
}

/// A duplicate-pair record as emitted to callers (design §6).
#[derive(Debug, Clone, Serialize)]
pub struct DupPairRecord {
    pub i1: usize,
    pub i2: usize,
    pub provider_id_1: Option<String>,
    pub provider_id_2: Option<String>,
    pub name_1: Option<String>,
    pub name_2: Option<String>,
    pub score: f64,
    pub name_score: f64,
    pub npi_match: bool,
    pub addr_score: f64,
    pub phone_match: bool,
    pub license_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub members: Vec<usize>,
    pub representative: usize,
}

pub type Clusters = BTreeMap<String, Cluster>;

pub fn cluster_id(min_member: usize) -> String {
    format!("cluster_{min_member}")
}
