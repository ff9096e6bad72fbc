//! Text normalizers (design §4.1).
//!
//! Every function here is total: unparsable or empty input coerces to an
//! absent value rather than an error, per the design's `UnparsableScalar`
//! disposition.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NPI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));
static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid regex"));

/// Trim, lowercase, replace runs of non-word/non-space with a single
/// space, collapse whitespace runs to one space.
pub fn clean_text(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    if lowered.is_empty() {
        return String::new();
    }
    let punct_stripped = NON_WORD_SPACE.replace_all(&lowered, " ");
    WHITESPACE
        .replace_all(&punct_stripped, " ")
        .trim()
        .to_string()
}

/// Keep ASCII digits only.
pub fn extract_digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Character n-grams over `clean_text(s)` with spaces replaced by `_`.
/// Returns the singleton set of the whole (possibly empty-padded) string
/// when shorter than `n`; empty input yields an empty set.
pub fn ngrams(s: &str, n: usize) -> std::collections::HashSet<String> {
    let cleaned = clean_text(s).replace(' ', "_");
    if cleaned.is_empty() {
        return std::collections::HashSet::new();
    }
    let chars: Vec<char> = cleaned.chars().collect();
    if chars.len() < n {
        return std::collections::HashSet::from([cleaned]);
    }
    (0..=chars.len() - n)
        .map(|i| chars[i..i + n].iter().collect())
        .collect()
}

/// Digits-only phone, or `None` if nothing remains.
pub fn normalize_phone(s: &str) -> Option<String> {
    let digits = extract_digits(s);
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Zero-padded/hyphenated zip normalization per the design table.
pub fn normalize_zip(s: &str) -> Option<String> {
    let digits = extract_digits(s);
    match digits.len() {
        0 => None,
        1..=4 => Some(format!("{:0>5}", digits)),
        5 => Some(digits),
        9 => Some(format!("{}-{}", &digits[..5], &digits[5..])),
        _ => Some(digits),
    }
}

/// Unicode-aware title case matching Python's `str.title()`: a "word"
/// boundary is any run of non-alphabetic characters, so apostrophes and
/// hyphens inside a name start a new word (`o'brien` -> `O'Brien`,
/// `smith-jones` -> `Smith-Jones`), not just whitespace.
pub fn to_title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.trim().chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

/// Uppercase, strip spaces and ASCII dashes; empty result is absent.
pub fn normalize_license(s: &str) -> Option<String> {
    let cleaned: String = s
        .trim()
        .to_uppercase()
        .chars()
        .filter(|&c| c != ' ' && c != '-')
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y-%m-%dT%H:%M:%S", "%m-%d-%Y"];

/// Permissive date parse; unparsable or empty input is absent.
pub fn normalize_datetime(s: &str) -> Option<chrono::NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = chrono::NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// `{true, yes, y, 1, t}` -> `Some(true)`; `{false, no, n, 0, f}` ->
/// `Some(false)`; anything else -> `None`. Case-insensitive, trimmed.
pub fn normalize_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "t" => Some(true),
        "false" | "no" | "n" | "0" | "f" => Some(false),
        _ => None,
    }
}

pub fn is_valid_npi(s: &str) -> bool {
    NPI_RE.is_match(s.trim())
}

pub fn is_valid_zip_format(s: &str) -> bool {
    ZIP_RE.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_collapses_punctuation_and_whitespace() {
        assert_eq!(clean_text("  Dr. John  O'Smith!! "), "dr john o smith");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn extract_digits_keeps_only_ascii_digits() {
        assert_eq!(extract_digits("(415) 555-0100"), "4155550100");
        assert_eq!(extract_digits(""), "");
    }

    #[test]
    fn ngrams_short_strings_return_singleton() {
        let g = ngrams("a", 2);
        assert_eq!(g, std::collections::HashSet::from(["a".to_string()]));
        assert!(ngrams("", 2).is_empty());
    }

    #[test]
    fn ngrams_normal_case() {
        let g = ngrams("ab cd", 2);
        // clean_text -> "ab cd" -> "ab_cd"
        assert_eq!(
            g,
            std::collections::HashSet::from([
                "ab".to_string(),
                "b_".to_string(),
                "_c".to_string(),
                "cd".to_string()
            ])
        );
    }

    #[test]
    fn zip_normalization_table() {
        assert_eq!(normalize_zip("95"), Some("00095".to_string()));
        assert_eq!(normalize_zip("94110"), Some("94110".to_string()));
        assert_eq!(normalize_zip("941101234"), Some("94110-1234".to_string()));
        assert_eq!(normalize_zip(""), None);
    }

    #[test]
    fn title_case_unicode() {
        assert_eq!(to_title("san jose"), "San Jose");
        assert_eq!(to_title("MARY ANN"), "Mary Ann");
    }

    #[test]
    fn title_case_treats_apostrophe_and_hyphen_as_word_boundaries() {
        assert_eq!(to_title("o'brien"), "O'Brien");
        assert_eq!(to_title("smith-jones"), "Smith-Jones");
    }

    #[test]
    fn license_normalization_strips_dashes_and_spaces() {
        assert_eq!(normalize_license(" a-1 23 "), Some("A123".to_string()));
        assert_eq!(normalize_license("--"), None);
        assert_eq!(normalize_license(""), None);
    }

    #[test]
    fn bool_normalization_sets() {
        assert_eq!(normalize_bool("YES"), Some(true));
        assert_eq!(normalize_bool("n"), Some(false));
        assert_eq!(normalize_bool("maybe"), None);
    }

    #[test]
    fn datetime_normalization_permissive() {
        assert!(normalize_datetime("2024-05-01").is_some());
        assert!(normalize_datetime("05/01/2024").is_some());
        assert_eq!(normalize_datetime(""), None);
        assert_eq!(normalize_datetime("not a date"), None);
    }
}
