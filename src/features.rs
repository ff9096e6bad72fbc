//! Feature extractor (design §4.2 of spec.md "Feature Extractor";
//! `DerivedFeatures` fields defined in §3).

use crate::normalize::{clean_text, extract_digits, ngrams};
use crate::row::{DerivedFeatures, Row};

/// Computes `DerivedFeatures` for every row, indexed in parallel with the
/// input slice. Pure function of the roster; called once per pipeline
/// invocation.
pub fn extract_all(rows: &[Row], ngram_n: usize) -> Vec<DerivedFeatures> {
    rows.iter().map(|r| extract_one(r, ngram_n)).collect()
}

fn extract_one(row: &Row, ngram_n: usize) -> DerivedFeatures {
    let full_name = row.full_name.as_deref().unwrap_or("");
    let clean_name = clean_text(full_name);
    let first_clean = clean_text(row.first_name.as_deref().unwrap_or(""));
    let last_clean = clean_text(row.last_name.as_deref().unwrap_or(""));
    let name_grams = ngrams(&clean_name, ngram_n);

    let addr_text = clean_text(&format!(
        "{} {} {}",
        row.practice_address_line1.as_deref().unwrap_or(""),
        row.practice_city.as_deref().unwrap_or(""),
        row.practice_state.as_deref().unwrap_or(""),
    ));
    let addr_grams = ngrams(&addr_text, ngram_n);

    let phone_digits = extract_digits(row.practice_phone.as_deref().unwrap_or(""));
    let npi_key = row.npi.as_deref().unwrap_or("").trim().to_string();

    let license_key = format!(
        "{}|{}",
        row.license_state.as_deref().unwrap_or("").to_uppercase(),
        row.license_number.as_deref().unwrap_or(""),
    );

    let city_state_key = format!(
        "{}|{}",
        clean_text(row.practice_city.as_deref().unwrap_or("")),
        clean_text(row.practice_state.as_deref().unwrap_or("")),
    );

    let last5: String = last_clean.chars().take(5).collect();
    let first2: String = first_clean.chars().take(2).collect();
    let name_key = if last5.is_empty() && first2.is_empty() {
        String::new()
    } else {
        format!("{last5}_{first2}")
    };

    let zip3 = extract_digits(row.practice_zip.as_deref().unwrap_or(""))
        .chars()
        .take(3)
        .collect::<String>();
    let zip3 = if zip3.len() == 3 { zip3 } else { String::new() };

    DerivedFeatures {
        clean_name,
        first_clean,
        last_clean,
        name_grams,
        addr_text,
        addr_grams,
        phone_digits,
        npi_key,
        license_key,
        city_state_key,
        name_key,
        zip3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(full_name: &str, first: &str, last: &str) -> Row {
        Row {
            full_name: Some(full_name.to_string()),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn name_key_uses_last5_first2() {
        let f = extract_one(&row("Ada Lovelace", "Ada", "Lovelace"), 2);
        assert_eq!(f.name_key, "lovel_ad");
    }

    #[test]
    fn name_key_empty_when_both_parts_empty() {
        let f = extract_one(&Row::default(), 2);
        assert_eq!(f.name_key, "");
    }

    #[test]
    fn zip3_requires_three_digits() {
        let mut r = Row::default();
        r.practice_zip = Some("94".to_string());
        let f = extract_one(&r, 2);
        assert_eq!(f.zip3, "");
        r.practice_zip = Some("94110".to_string());
        let f = extract_one(&r, 2);
        assert_eq!(f.zip3, "941");
    }

    #[test]
    fn license_key_sentinel_when_both_absent() {
        let f = extract_one(&Row::default(), 2);
        assert_eq!(f.license_key, "|");
    }
}
