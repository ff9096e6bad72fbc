//! Standardizer (design §4.6): rewrites the deduplicated roster with
//! canonical formatting and rebuilt full names.

use crate::normalize::{normalize_phone, normalize_zip, to_title};
use crate::row::Row;

pub fn standardize(mut rows: Vec<Row>) -> Vec<Row> {
    for row in &mut rows {
        standardize_row(row);
    }
    rows
}

fn standardize_row(row: &mut Row) {
    row.practice_phone = row.practice_phone.as_deref().and_then(normalize_phone);
    row.mailing_zip = row.mailing_zip.as_deref().and_then(normalize_zip);

    row.first_name = row.first_name.as_deref().map(to_title);
    row.last_name = row.last_name.as_deref().map(to_title);
    row.practice_city = row.practice_city.as_deref().map(to_title);
    row.mailing_city = row.mailing_city.as_deref().map(to_title);
    row.practice_address_line1 = row.practice_address_line1.as_deref().map(to_title);
    row.practice_address_line2 = row.practice_address_line2.as_deref().map(to_title);
    row.mailing_address_line1 = row.mailing_address_line1.as_deref().map(to_title);
    row.mailing_address_line2 = row.mailing_address_line2.as_deref().map(to_title);
    row.medical_school = row.medical_school.as_deref().map(to_title);
    row.residency_program = row.residency_program.as_deref().map(to_title);

    row.full_name = build_full_name(row);
}

fn build_full_name(row: &Row) -> Option<String> {
    let first = row.first_name.as_deref()?;
    let last = row.last_name.as_deref()?;
    let mut full = format!("{first} {last}");
    if let Some(cred) = row.credential.as_deref() {
        full.push_str(&format!(", {}", cred.trim()));
    }
    Some(full)
}
