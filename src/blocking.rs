//! Blocker (design §4.3).
//!
//! Emits candidate pairs by grouping rows that share a blocking key, plus
//! a sorted-neighborhood sweep over last names. Blocks outside
//! `[min_block, max_block]` are dropped before pairs are generated.

use crate::config::SORTED_NEIGHBORHOOD_BUCKET_SIZE;
use crate::row::{DerivedFeatures, Pair};
use std::collections::{BTreeMap, HashSet};

/// Mapping from blocking key to the set of member row indices. Insertion
/// order is irrelevant; sorted lists are only materialized when combining
/// into pairs.
pub type Blocks = BTreeMap<String, HashSet<usize>>;

pub fn create_blocks(features: &[DerivedFeatures]) -> Blocks {
    let mut blocks: Blocks = BTreeMap::new();

    for (idx, f) in features.iter().enumerate() {
        if !f.npi_key.is_empty() {
            blocks.entry(format!("npi:{}", f.npi_key)).or_default().insert(idx);
        }
        if !f.phone_digits.is_empty() {
            let tail = tail(&f.phone_digits, 7);
            let head = head(&f.phone_digits, 3);
            blocks.entry(format!("phone7:{tail}")).or_default().insert(idx);
            blocks.entry(format!("phone3:{head}")).or_default().insert(idx);
        }
        if !f.license_key.is_empty() && f.license_key != "|" {
            blocks.entry(format!("lic:{}", f.license_key)).or_default().insert(idx);
        }
        if !f.zip3.is_empty() {
            blocks.entry(format!("zip:{}", f.zip3)).or_default().insert(idx);
        }
        if !f.city_state_key.is_empty() && f.city_state_key != "|" {
            blocks
                .entry(format!("cityst:{}", f.city_state_key))
                .or_default()
                .insert(idx);
        }
        if !f.name_key.is_empty() {
            blocks.entry(format!("namekey:{}", f.name_key)).or_default().insert(idx);
        }
        if !f.zip3.is_empty() && !f.last_clean.is_empty() {
            let last3 = head(&f.last_clean, 3);
            blocks
                .entry(format!("loose:{}_{}", f.zip3, last3))
                .or_default()
                .insert(idx);
        }
    }

    let mut sorted_idx: Vec<usize> = (0..features.len()).collect();
    sorted_idx.sort_by(|&a, &b| features[a].last_clean.cmp(&features[b].last_clean));
    for (pos, idx) in sorted_idx.into_iter().enumerate() {
        let bucket = pos / SORTED_NEIGHBORHOOD_BUCKET_SIZE;
        blocks.entry(format!("sn:{bucket}")).or_default().insert(idx);
    }

    blocks
}

fn head(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn tail(s: &str, n: usize) -> String {
    let len = s.chars().count();
    if len <= n {
        s.to_string()
    } else {
        s.chars().skip(len - n).collect()
    }
}

pub fn retain_blocks(blocks: Blocks, min_block: usize, max_block: usize) -> Blocks {
    blocks
        .into_iter()
        .filter(|(_, members)| members.len() >= min_block && members.len() <= max_block)
        .collect()
}

/// Candidate pairs: union over retained blocks of all unordered pairs
/// drawn from each block's members, deduplicated across blocks.
pub fn candidate_pairs(blocks: &Blocks) -> HashSet<Pair> {
    let mut pairs = HashSet::new();
    for members in blocks.values() {
        if members.len() < 2 {
            continue;
        }
        let mut sorted: Vec<usize> = members.iter().copied().collect();
        sorted.sort_unstable();
        for a_pos in 0..sorted.len() {
            for b_pos in (a_pos + 1)..sorted.len() {
                pairs.insert(Pair::new(sorted[a_pos], sorted[b_pos]));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_all;
    use crate::row::Row;

    fn row(npi: &str, phone: &str, last: &str) -> Row {
        Row {
            npi: Some(npi.to_string()),
            practice_phone: Some(phone.to_string()),
            last_name: Some(last.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn npi_block_groups_matching_rows() {
        let rows = vec![
            row("1234567890", "4155550100", "Lovelace"),
            row("1234567890", "4155550199", "Lovelace"),
            row("9999999999", "2125550000", "Smith"),
        ];
        let features = extract_all(&rows, 2);
        let blocks = create_blocks(&features);
        let npi_block = &blocks["npi:1234567890"];
        assert_eq!(npi_block.len(), 2);
        assert!(npi_block.contains(&0) && npi_block.contains(&1));
    }

    #[test]
    fn block_size_window_filters_out_of_range_blocks() {
        let rows: Vec<Row> = (0..600)
            .map(|i| row("", &format!("415555{i:04}"), "Smith"))
            .collect();
        let features = extract_all(&rows, 2);
        let blocks = create_blocks(&features);
        let retained = retain_blocks(blocks, 1, 500);
        // namekey:smith_ would have 600 members and gets dropped.
        assert!(!retained.contains_key("namekey:smith_"));
    }

    #[test]
    fn candidate_pairs_are_deduplicated_across_blocks() {
        let rows = vec![
            row("1234567890", "4155550100", "Lovelace"),
            row("1234567890", "4155550100", "Lovelace"),
        ];
        let features = extract_all(&rows, 2);
        let blocks = retain_blocks(create_blocks(&features), 1, 500);
        let pairs = candidate_pairs(&blocks);
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains(&Pair::new(0, 1)));
    }
}
