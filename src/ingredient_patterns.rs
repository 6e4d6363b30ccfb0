//! # Ingredient Patterns Module
//!
//! The pattern catalogue, unit vocabulary and compiled regexes shared by every
//! parse. Everything here is built once on first use and never mutated, so a
//! single catalogue serves concurrent parses without locking.
//!
//! The catalogue is data: each canonical ingredient name maps to an ordered list
//! of label spellings. A spelling is literal text; spaces in it match any run of
//! whitespace (including none, since OCR often drops spaces).

use lazy_static::lazy_static;
use regex::Regex;

/// Longest run of non-digit characters allowed between a name and its quantity
pub const MAX_GAP_CHARS: usize = 40;

/// Unit alternation, longest tokens first so "mcg" wins over "mg" and "g"
pub const UNIT_PATTERN: &str = r"mcg|μg|µg|mg|g|iu";

/// Decimal amount, optionally with thousands separators ("1,000")
pub const AMOUNT_PATTERN: &str = r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?";

/// Keywords that mark a descriptive supplement component in the composite tier
pub const COMPOSITE_KEYWORDS: &[&str] = &["powder", "complex", "extract", "oil", "acid"];

/// (canonical name, spellings) in catalogue order
pub const CATALOGUE: &[(&str, &[&str])] = &[
    ("Vitamin A", &["vitamin a", "retinyl palmitate", "beta carotene"]),
    ("Vitamin C", &["vitamin c", "ascorbic acid"]),
    (
        "Vitamin D",
        &["vitamin d", "vitamin d3", "vitamin d2", "cholecalciferol", "ergocalciferol"],
    ),
    ("Vitamin E", &["vitamin e", "tocopherol", "tocopheryl"]),
    ("Vitamin K", &["vitamin k", "vitamin k1", "vitamin k2", "phylloquinone", "menaquinone"]),
    ("Vitamin B1", &["thiamin", "thiamine", "vitamin b1"]),
    ("Vitamin B2", &["riboflavin", "vitamin b2"]),
    ("Vitamin B3", &["niacin", "niacinamide", "vitamin b3"]),
    ("Vitamin B6", &["vitamin b6", "pyridoxine"]),
    ("Vitamin B12", &["vitamin b12", "cobalamin", "cyanocobalamin", "methylcobalamin"]),
    ("Folic Acid", &["folic acid", "folate", "vitamin b9"]),
    ("Biotin", &["biotin"]),
    ("Calcium", &["calcium"]),
    ("Iron", &["iron"]),
    ("Magnesium", &["magnesium"]),
    ("Zinc", &["zinc"]),
    ("Iodine", &["iodine"]),
    ("Docosahexaenoic Acid", &["dha", "docosahexaenoic acid"]),
    ("Rose Hips", &["rose hips"]),
    ("Bioflavonoid Complex", &["bioflavonoid", "bioflavonoids", "citrus bioflavonoid"]),
];

/// One catalogue entry with its compiled spellings
#[derive(Debug)]
pub struct CatalogueEntry {
    pub canonical_name: &'static str,
    /// One regex per spelling, each capturing `gap`, `amount` and `unit`
    pub patterns: Vec<Regex>,
}

/// Build the lexical regex for a single spelling
///
/// ```text
/// \b<spelling>\b(?P<gap>[^0-9]{0,40}?)(?P<amount>...)\s*(?P<unit>...)\b
/// ```
fn build_lexical_pattern(spelling: &str) -> String {
    let name = spelling
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*");
    format!(
        r"\b{}\b(?P<gap>[^0-9]{{0,{}}}?)(?P<amount>{})\s*(?P<unit>{})\b",
        name, MAX_GAP_CHARS, AMOUNT_PATTERN, UNIT_PATTERN
    )
}

fn build_catalogue() -> Vec<CatalogueEntry> {
    CATALOGUE
        .iter()
        .map(|(canonical_name, spellings)| CatalogueEntry {
            canonical_name,
            patterns: spellings
                .iter()
                .map(|spelling| {
                    Regex::new(&build_lexical_pattern(spelling))
                        .expect("Catalogue spelling should compile to a valid pattern")
                })
                .collect(),
        })
        .collect()
}

/// Descriptive phrase of up to three words ending in a keyword, then a quantity.
/// Single letters count as words ("vitamin b complex").
fn build_composite_pattern() -> String {
    format!(
        r"\b(?P<name>(?:[a-z][a-z'\-]*\s+){{0,3}}(?:{})s?)\b(?P<gap>[^0-9%]{{0,{}}}?)(?P<amount>{})\s*(?P<unit>{})\b",
        COMPOSITE_KEYWORDS.join("|"),
        MAX_GAP_CHARS,
        AMOUNT_PATTERN,
        UNIT_PATTERN
    )
}

/// Non-numeric leading text of a line, then a quantity
fn build_fallback_pattern() -> String {
    format!(
        r"^(?P<name>[^0-9]+?)\s*(?P<amount>{})\s*(?P<unit>{})\b",
        AMOUNT_PATTERN, UNIT_PATTERN
    )
}

lazy_static! {
    /// The read-only ingredient catalogue, compiled once per process
    pub static ref PATTERN_CATALOGUE: Vec<CatalogueEntry> = build_catalogue();

    pub static ref COMPOSITE_REGEX: Regex = Regex::new(&build_composite_pattern())
        .expect("Composite ingredient pattern should be valid");

    pub static ref FALLBACK_REGEX: Regex = Regex::new(&build_fallback_pattern())
        .expect("Fallback ingredient pattern should be valid");

    /// Percent daily value directly after a quantity, optionally behind a parenthetical
    pub static ref PERCENT_DV_REGEX: Regex =
        Regex::new(r"^\s*(?:\([^)]*\)\s*)?(?P<pct><?\s*\d{1,4}(?:\.\d+)?)\s*%")
            .expect("Percent daily value pattern should be valid");

    /// One or two plain words left between a composite name and its quantity
    pub static ref DESCRIPTOR_WORDS_REGEX: Regex =
        Regex::new(r"^[a-z][a-z'\-]*(?:\s+[a-z][a-z'\-]*)?$")
            .expect("Descriptor words pattern should be valid");

    /// A "(...)" group, possibly cut off at the end of the text
    pub static ref PARENTHETICAL_REGEX: Regex = Regex::new(r"\([^)]*\)?")
        .expect("Parenthetical pattern should be valid");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_compiles() {
        assert_eq!(PATTERN_CATALOGUE.len(), CATALOGUE.len());
        for entry in PATTERN_CATALOGUE.iter() {
            assert!(!entry.patterns.is_empty(), "{} has no spellings", entry.canonical_name);
        }
    }

    #[test]
    fn test_canonical_names_are_valid_record_names() {
        for (name, _) in CATALOGUE {
            assert!(name.trim().chars().count() > 3, "{} is too short", name);
        }
    }

    #[test]
    fn test_lexical_pattern_captures_quantity() {
        let regex = Regex::new(&build_lexical_pattern("vitamin c")).unwrap();
        let caps = regex.captures("vitamin c (as ascorbic acid) 1g (1,000 mg)").unwrap();
        assert_eq!(&caps["amount"], "1");
        assert_eq!(&caps["unit"], "g");
        assert_eq!(&caps["gap"], " (as ascorbic acid) ");
    }

    #[test]
    fn test_lexical_pattern_tolerates_missing_space() {
        let regex = Regex::new(&build_lexical_pattern("vitamin d3")).unwrap();
        let caps = regex.captures("vitamind3 400iu").unwrap();
        assert_eq!(&caps["amount"], "400");
        assert_eq!(&caps["unit"], "iu");
    }

    #[test]
    fn test_lexical_pattern_respects_word_boundaries() {
        let regex = Regex::new(&build_lexical_pattern("vitamin d")).unwrap();
        assert!(!regex.is_match("vitamin d3 400 iu"));

        let regex = Regex::new(&build_lexical_pattern("vitamin b1")).unwrap();
        assert!(!regex.is_match("vitamin b12 6 mcg"));
    }

    #[test]
    fn test_lexical_gap_is_bounded() {
        let regex = Regex::new(&build_lexical_pattern("zinc")).unwrap();
        let far = format!("zinc {} 15 mg", "x".repeat(MAX_GAP_CHARS + 5));
        assert!(!regex.is_match(&far));
    }

    #[test]
    fn test_thousands_separator_amount() {
        let regex = Regex::new(&build_lexical_pattern("vitamin a")).unwrap();
        let caps = regex.captures("vitamin a 1,500 mcg").unwrap();
        assert_eq!(&caps["amount"], "1,500");
    }

    #[test]
    fn test_composite_pattern_stops_name_at_keyword() {
        let caps = COMPOSITE_REGEX
            .captures("rose hips powder olin (rosa canina) (fruit) 25 mg")
            .unwrap();
        assert_eq!(&caps["name"], "rose hips powder");
        assert_eq!(&caps["amount"], "25");
        assert_eq!(&caps["unit"], "mg");
    }

    #[test]
    fn test_composite_pattern_keeps_single_letter_words() {
        let caps = COMPOSITE_REGEX.captures("vitamin b complex 50 mg").unwrap();
        assert_eq!(&caps["name"], "vitamin b complex");
        assert_eq!(&caps["gap"], " ");
    }

    #[test]
    fn test_descriptor_words_pattern() {
        assert!(DESCRIPTOR_WORDS_REGEX.is_match("concentrate"));
        assert!(DESCRIPTOR_WORDS_REGEX.is_match("seed concentrate"));
        assert!(!DESCRIPTOR_WORDS_REGEX.is_match(""));
        assert!(!DESCRIPTOR_WORDS_REGEX.is_match("olin (rosa canina) (fruit)"));
        assert!(!DESCRIPTOR_WORDS_REGEX.is_match("one two three"));
    }

    #[test]
    fn test_fallback_pattern_is_line_anchored() {
        let caps = FALLBACK_REGEX.captures("hesperidin 25 mg 10%").unwrap();
        assert_eq!(&caps["name"], "hesperidin");
        assert!(FALLBACK_REGEX.captures("1111% 25 mg").is_none());
    }

    #[test]
    fn test_percent_daily_value_pattern() {
        let caps = PERCENT_DV_REGEX.captures(" 556%").unwrap();
        assert_eq!(&caps["pct"], "556");
        let caps = PERCENT_DV_REGEX.captures(" (1,000 mg) 1111%").unwrap();
        assert_eq!(&caps["pct"], "1111");
        assert!(PERCENT_DV_REGEX.captures(" (1,000 mg)").is_none());
    }
}
