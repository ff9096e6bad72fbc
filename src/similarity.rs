//! Similarity primitives (design §4.2).

use crate::normalize::{clean_text, extract_digits};
use std::collections::HashSet;

/// `|A∩B| / |A∪B|`; both empty -> 1.0, exactly one empty -> 0.0.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.union(b).count();
    inter as f64 / union as f64
}

/// Jaccard over whitespace-split tokens of `clean_text(a)`/`clean_text(b)`.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let ca = clean_text(a);
    let cb = clean_text(b);
    if ca.is_empty() && cb.is_empty() {
        return 1.0;
    }
    if ca.is_empty() || cb.is_empty() {
        return 0.0;
    }
    let ta: HashSet<&str> = ca.split_whitespace().collect();
    let tb: HashSet<&str> = cb.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let inter = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    inter as f64 / union as f64
}

/// 1.0 if the digit strings are equal, or share an identical suffix of
/// length `min(10, max(7, min(len1, len2)))` when both have length >= 7;
/// 0.0 otherwise. Accepts raw phone strings and digit-extracts them.
pub fn phone_match(p1: &str, p2: &str) -> f64 {
    let d1 = extract_digits(p1);
    let d2 = extract_digits(p2);
    phone_match_digits(&d1, &d2)
}

/// Same as [`phone_match`] but takes already digit-extracted strings.
pub fn phone_match_digits(d1: &str, d2: &str) -> f64 {
    if d1.is_empty() || d2.is_empty() {
        return 0.0;
    }
    if d1 == d2 {
        return 1.0;
    }
    if d1.len() >= 7 && d2.len() >= 7 {
        let l = 10.min(7.max(d1.len().min(d2.len())));
        let t1 = &d1[d1.len() - l..];
        let t2 = &d2[d2.len() - l..];
        if t1 == t2 {
            return 1.0;
        }
    }
    0.0
}
