//! # Section Detection Module
//!
//! Locates the regions of a label that matter for extraction: the Supplement
//! Facts panel, its header lines and footnotes, and the auxiliary fields
//! (product name and serving size) read from the original-case lines.

use tracing::debug;

use crate::parser_config::ContextDefaults;

/// Words that disqualify a line from being the product name
pub const PRODUCT_NAME_STOPLIST: &[&str] =
    &["supplement", "facts", "serving", "size", "tablet", "capsule"];

/// Number of leading non-empty lines considered for the product name
pub const PRODUCT_NAME_SCAN_LINES: usize = 5;

const PANEL_ANCHOR: &str = "supplement facts";
const PANEL_END_MARKERS: &[&str] = &["other ingredients"];
const PANEL_HEADERS: &[&str] = &[
    "supplement facts",
    "serving size",
    "servings per container",
    "amount per serving",
];
const FOOTNOTE_PREFIXES: &[char] = &['†', '‡'];
const FOOTNOTE_MARKERS: &[&str] = &["daily value not established", "value not established"];

/// Product name and serving size found on a label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelContext {
    pub product_name: String,
    pub serving_size: Option<String>,
}

/// Footnote lines are excluded from every matching tier
pub fn is_footnote(raw_line: &str, normalized_line: &str) -> bool {
    raw_line.trim_start().starts_with(FOOTNOTE_PREFIXES)
        || FOOTNOTE_MARKERS
            .iter()
            .any(|marker| normalized_line.contains(marker))
}

/// The "Supplement Facts" heading that opens the panel
pub fn is_panel_anchor(normalized_line: &str) -> bool {
    normalized_line.contains(PANEL_ANCHOR)
}

/// A line after which the panel is considered closed
pub fn is_panel_end(normalized_line: &str) -> bool {
    PANEL_END_MARKERS
        .iter()
        .any(|marker| normalized_line.contains(marker))
}

/// Panel header lines never name an ingredient
pub fn is_panel_header(normalized_line: &str) -> bool {
    PANEL_HEADERS
        .iter()
        .any(|header| normalized_line.contains(header))
}

/// Read the product name and serving size from the label's lines.
///
/// Never fails: missing fields take the configured defaults.
pub fn detect_context(lines: &[&str], defaults: &ContextDefaults) -> LabelContext {
    let product_name = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .take(PRODUCT_NAME_SCAN_LINES)
        .find(|line| is_product_name_candidate(line))
        .map(title_case)
        .unwrap_or_else(|| defaults.product_name.clone());

    let serving_size = lines
        .iter()
        .find(|line| line.to_lowercase().contains("serving size"))
        .map(|line| line.trim().to_string())
        .or_else(|| defaults.serving_size.clone());

    debug!(
        product_name = %product_name,
        serving_size = ?serving_size,
        "Detected label context"
    );

    LabelContext {
        product_name,
        serving_size,
    }
}

fn is_product_name_candidate(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.chars().count() > 3
        && !line.chars().all(|c| c.is_ascii_digit())
        && line.chars().any(char::is_alphabetic)
        && !line.contains('%')
        && !is_footnote(line, &lower)
        && !PRODUCT_NAME_STOPLIST.iter().any(|word| lower.contains(word))
}

/// Title-case text the way labels print names: a letter is upper-cased when it
/// does not follow another letter ("vitamin b12" -> "Vitamin B12").
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }
    result
}
