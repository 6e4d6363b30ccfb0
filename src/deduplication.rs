//! # Ingredient Deduplication Module
//!
//! Turns raw matcher candidates into the final ingredient list:
//!
//! - Names are cleaned (trailing parentheticals, connectives, punctuation) and title-cased
//! - Degenerate names are rejected (too short, numeric, percentage artifacts)
//! - Candidates anchored on the same quantity merge into one ingredient
//! - Records sharing (lower-cased name, amount, unit) collapse, first occurrence wins

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::ingredient_matcher::{Candidate, MatchTier};
use crate::observability;
use crate::parser_config::{ParserConfig, UnitCase};
use crate::section_detection::{title_case, LabelContext};
use crate::types::{ExtractionResult, IngredientRecord, Unit};

/// Minimum number of characters a cleaned name must exceed
pub const MIN_NAME_CHARS: usize = 3;

/// Leading words that join a name to a qualifier rather than naming anything
const LEADING_CONNECTIVES: &[&str] = &["as ", "from ", "of ", "and ", "with ", "the "];

lazy_static! {
    /// A trailing "(...)" group, closed or cut off by the end of the capture
    static ref TRAILING_PARENTHETICAL: Regex = Regex::new(r"\s*\([^()]*\)?\s*$")
        .expect("Trailing parenthetical pattern should be valid");
}

/// Why a candidate did not become a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingName,
    TooShort,
    Numeric,
    Percentage,
    UnknownUnit,
    InvalidAmount,
    Duplicate,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingName => "missing_name",
            RejectReason::TooShort => "too_short",
            RejectReason::Numeric => "numeric",
            RejectReason::Percentage => "percentage",
            RejectReason::UnknownUnit => "unknown_unit",
            RejectReason::InvalidAmount => "invalid_amount",
            RejectReason::Duplicate => "duplicate",
        }
    }
}

/// Clean a captured name for display.
///
/// ```
/// use supplement_facts::deduplication::clean_name;
///
/// assert_eq!(clean_name("rose hips powder (rosa canina) (fruit)"), "Rose Hips Powder");
/// assert_eq!(clean_name("as  ascorbic acid:"), "Ascorbic Acid");
/// ```
pub fn clean_name(raw: &str) -> String {
    let mut name = raw.trim().to_string();

    while TRAILING_PARENTHETICAL.is_match(&name) {
        let stripped = TRAILING_PARENTHETICAL.replace(&name, "").into_owned();
        if stripped == name {
            break;
        }
        name = stripped;
    }

    let mut name = name
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(|c: char| !c.is_alphanumeric())
        .to_string();

    while let Some(connective) = LEADING_CONNECTIVES.iter().find(|connective| {
        name.get(..connective.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(connective))
    }) {
        name = name[connective.len()..].trim_start().to_string();
    }

    title_case(&name.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Check a cleaned name against the record invariants
pub fn check_name(name: &str) -> Result<(), RejectReason> {
    let trimmed = name.trim();
    if trimmed.contains('%') {
        return Err(RejectReason::Percentage);
    }
    if !trimmed.chars().any(char::is_alphabetic) {
        return Err(RejectReason::Numeric);
    }
    if trimmed.chars().count() <= MIN_NAME_CHARS {
        return Err(RejectReason::TooShort);
    }
    Ok(())
}

/// Normalize an amount to a non-negative decimal string without separators
pub fn clean_amount(amount: &str) -> Result<String, RejectReason> {
    let cleaned: String = amount.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.is_finite() && !cleaned.starts_with('+') => Ok(cleaned),
        _ => Err(RejectReason::InvalidAmount),
    }
}

/// Accumulates validated, deduplicated records in insertion order
#[derive(Debug)]
pub struct RecordAssembler {
    unit_case: UnitCase,
    seen: HashSet<(String, String, Unit)>,
    records: Vec<IngredientRecord>,
}

impl RecordAssembler {
    pub fn new(unit_case: UnitCase) -> Self {
        Self {
            unit_case,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Clean, validate and add one record.
    ///
    /// Returns `Ok(false)` when an equal record was already added.
    pub fn push(
        &mut self,
        raw_name: &str,
        amount: &str,
        unit: &str,
        percent_daily_value: Option<String>,
    ) -> Result<bool, RejectReason> {
        let name = clean_name(raw_name);
        check_name(&name)?;
        let amount = clean_amount(amount)?;
        let unit = Unit::from_token(unit).ok_or(RejectReason::UnknownUnit)?;

        if !self.seen.insert((name.to_lowercase(), amount.clone(), unit)) {
            return Ok(false);
        }

        self.records.push(IngredientRecord {
            name,
            amount,
            unit: unit.render(self.unit_case).to_string(),
            percent_daily_value,
        });
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<IngredientRecord> {
        self.records
    }
}

/// A candidate whose name passed cleanup
#[derive(Debug, Clone)]
struct NamedCandidate {
    name: String,
    candidate: Candidate,
}

impl NamedCandidate {
    fn words(&self) -> Vec<String> {
        self.name
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect()
    }
}

/// Collapse candidates anchored on the same quantity to one per quantity.
///
/// The winner has the highest tier, then the shortest gap. A lexical winner is
/// replaced by the longest composite name that extends it word by word, and a
/// composite winner by the longest panel-line name that ends with it.
fn merge_spans(mut named: Vec<NamedCandidate>) -> Vec<NamedCandidate> {
    named.sort_by_key(|n| (n.candidate.amount_offset, n.candidate.tier));

    let mut merged = Vec::new();
    let mut start = 0;
    while start < named.len() {
        let offset = named[start].candidate.amount_offset;
        let end = named[start..]
            .iter()
            .position(|n| n.candidate.amount_offset != offset)
            .map_or(named.len(), |len| start + len);
        let group = &named[start..end];

        let Some(mut winner) = group
            .iter()
            .min_by_key(|n| (n.candidate.tier, n.candidate.gap_len))
            .cloned()
        else {
            break;
        };

        if winner.candidate.tier == MatchTier::Lexical {
            let winner_words = winner.words();
            let extension = group
                .iter()
                .filter(|n| n.candidate.tier == MatchTier::Composite)
                .filter(|n| {
                    let words = n.words();
                    words.len() > winner_words.len() && words.starts_with(&winner_words)
                })
                .max_by_key(|n| n.words().len());
            if let Some(extension) = extension {
                trace!("'{}' extends '{}'", extension.name, winner.name);
                winner.name = extension.name.clone();
            }
        } else if winner.candidate.tier == MatchTier::Composite {
            let winner_words = winner.words();
            let extension = group
                .iter()
                .filter(|n| n.candidate.tier == MatchTier::Fallback)
                .filter(|n| {
                    let words = n.words();
                    words.len() > winner_words.len() && words.ends_with(&winner_words)
                })
                .max_by_key(|n| n.words().len());
            if let Some(extension) = extension {
                trace!("'{}' extends '{}'", extension.name, winner.name);
                winner.name = extension.name.clone();
            }
        }

        if group.len() > 1 {
            trace!(
                "Merged {} candidates at offset {} into '{}'",
                group.len(),
                offset,
                winner.name
            );
        }
        merged.push(winner);
        start = end;
    }
    merged
}

/// Build the extraction result from the matcher's candidates.
///
/// Always succeeds; an empty ingredient list is a valid result.
pub fn assemble(
    raw_text: &str,
    candidates: Vec<Candidate>,
    context: LabelContext,
    config: &ParserConfig,
) -> ExtractionResult {
    let candidate_count = candidates.len();
    let named: Vec<NamedCandidate> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let name = clean_name(&candidate.raw_name);
            match check_name(&name) {
                Ok(()) => Some(NamedCandidate { name, candidate }),
                Err(reason) => {
                    trace!(
                        "Rejected candidate '{}': {}",
                        candidate.raw_name,
                        reason.as_str()
                    );
                    observability::record_rejected_candidate(reason.as_str());
                    None
                }
            }
        })
        .collect();

    let merged = merge_spans(named);

    let mut assembler = RecordAssembler::new(config.unit_case);
    for NamedCandidate { name, candidate } in merged {
        match assembler.push(
            &name,
            &candidate.amount,
            &candidate.unit,
            candidate.percent_daily_value,
        ) {
            Ok(true) => {}
            Ok(false) => {
                trace!("Duplicate ingredient '{}' {} {}", name, candidate.amount, candidate.unit);
                observability::record_rejected_candidate(RejectReason::Duplicate.as_str());
            }
            Err(reason) => {
                trace!("Rejected ingredient '{}': {}", name, reason.as_str());
                observability::record_rejected_candidate(reason.as_str());
            }
        }
    }

    debug!(
        candidates = candidate_count,
        ingredients = assembler.len(),
        "Assembled extraction result"
    );

    ExtractionResult {
        success: true,
        product_name: context.product_name,
        serving_size: context.serving_size,
        ingredients: assembler.into_records(),
        raw_text: raw_text.to_string(),
        method: config.method,
        error: None,
    }
}
