//! # Ingredient Matcher Module
//!
//! Scans the normalized text with three tiers of patterns, in priority order:
//!
//! 1. **Lexical**: catalogue spellings followed by a quantity ("vitamin c ... 1g")
//! 2. **Composite**: a short phrase ending in a keyword (powder, complex, extract,
//!    oil, acid) followed by a quantity ("rose hips powder ... 25 mg")
//! 3. **Fallback**: any non-numeric line prefix followed by a quantity, only on
//!    lines inside the Supplement Facts panel
//!
//! Every tier runs; the result is the union of all matches. Overlapping matches
//! for the same quantity stay separate candidates and are resolved during
//! assembly.

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::ingredient_patterns::{
    COMPOSITE_REGEX, DESCRIPTOR_WORDS_REGEX, FALLBACK_REGEX, PARENTHETICAL_REGEX,
    PATTERN_CATALOGUE, PERCENT_DV_REGEX,
};
use crate::normalization::{NormalizedText, ScanLine};
use crate::observability;

/// Matching tier, ordered by precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Lexical,
    Composite,
    Fallback,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Lexical => "lexical",
            MatchTier::Composite => "composite",
            MatchTier::Fallback => "fallback",
        }
    }
}

/// An unvalidated ingredient match
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Catalogue name for lexical matches, captured text otherwise
    pub raw_name: String,
    /// Amount as captured, thousands separators removed
    pub amount: String,
    /// Unit token as captured
    pub unit: String,
    pub tier: MatchTier,
    /// Byte offset of the amount in the scan text; candidates sharing it
    /// describe the same quantity
    pub amount_offset: usize,
    /// Characters between the end of the name and the amount
    pub gap_len: usize,
    pub percent_daily_value: Option<String>,
}

/// Applies the pattern tiers to a normalized text
#[derive(Debug, Clone)]
pub struct IngredientMatcher {
    enable_composite: bool,
    enable_fallback: bool,
}

impl Default for IngredientMatcher {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl IngredientMatcher {
    pub fn new(enable_composite: bool, enable_fallback: bool) -> Self {
        Self {
            enable_composite,
            enable_fallback,
        }
    }

    /// Find every candidate in the text, in tier order
    pub fn find_candidates(&self, text: &NormalizedText) -> Vec<Candidate> {
        let mut candidates = self.match_lexical(text);
        let lexical_count = candidates.len();

        if self.enable_composite {
            candidates.extend(self.match_composite(text));
        }
        let composite_count = candidates.len() - lexical_count;

        if self.enable_fallback {
            candidates.extend(self.match_fallback(text));
        }
        let fallback_count = candidates.len() - lexical_count - composite_count;

        observability::record_candidate_metrics(MatchTier::Lexical.as_str(), lexical_count);
        observability::record_candidate_metrics(MatchTier::Composite.as_str(), composite_count);
        observability::record_candidate_metrics(MatchTier::Fallback.as_str(), fallback_count);
        debug!(
            lexical = lexical_count,
            composite = composite_count,
            fallback = fallback_count,
            "Ingredient candidates found"
        );
        candidates
    }

    fn match_lexical(&self, text: &NormalizedText) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for entry in PATTERN_CATALOGUE.iter() {
            for pattern in &entry.patterns {
                for caps in line_bound_captures(pattern, text) {
                    let candidate = build_candidate(
                        text,
                        &caps,
                        0,
                        entry.canonical_name.to_string(),
                        MatchTier::Lexical,
                    );
                    trace!(
                        "Lexical match '{}' -> {} {}",
                        entry.canonical_name,
                        candidate.amount,
                        candidate.unit
                    );
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    fn match_composite(&self, text: &NormalizedText) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for caps in line_bound_captures(&COMPOSITE_REGEX, text) {
            let Some(name_match) = caps.name("name") else {
                continue;
            };
            // The phrase belongs to the line its keyword is on
            let name_start = text
                .line_at(name_match.end())
                .map_or(name_match.start(), |line| line.start.max(name_match.start()));
            let mut name = text.scan[name_start..name_match.end()].to_string();

            // "(as ascorbic acid)" qualifies the ingredient before it
            if opens_inside_parenthesis(text, name_start) {
                trace!("Skipping parenthetical composite match '{}'", name);
                continue;
            }

            let trailing = caps.name("gap").map_or("", |m| m.as_str().trim());
            let descriptive = DESCRIPTOR_WORDS_REGEX.is_match(trailing);
            if descriptive {
                name = format!("{} {}", name, trailing);
            }

            trace!("Composite match '{}'", name);
            let mut candidate = build_candidate(text, &caps, 0, name, MatchTier::Composite);
            if descriptive {
                candidate.gap_len = 0;
            }
            candidates.push(candidate);
        }
        candidates
    }

    fn match_fallback(&self, text: &NormalizedText) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for line in text.lines.iter().filter(|l| l.in_panel && !l.is_header) {
            let line_text = text.line_text(line);
            if let Some(caps) = FALLBACK_REGEX.captures(line_text) {
                let name = caps["name"].trim().to_string();
                trace!("Fallback match '{}' on panel line '{}'", name, line_text);
                candidates.push(build_candidate(text, &caps, line.start, name, MatchTier::Fallback));
            }
        }
        candidates
    }
}

/// Build a candidate from captures taken at `base` within the scan text
fn build_candidate(
    text: &NormalizedText,
    caps: &Captures,
    base: usize,
    raw_name: String,
    tier: MatchTier,
) -> Candidate {
    let amount = caps.name("amount").map(|m| m.as_str()).unwrap_or("");
    let amount_offset = base + caps.name("amount").map(|m| m.start()).unwrap_or(0);
    let unit_end = base + caps.name("unit").map(|m| m.end()).unwrap_or(0);
    let gap_len = caps
        .name("gap")
        .map(|m| m.as_str().chars().count())
        .unwrap_or(0);

    Candidate {
        raw_name,
        amount: amount.replace(',', ""),
        unit: caps.name("unit").map(|m| m.as_str()).unwrap_or("").to_string(),
        tier,
        amount_offset,
        gap_len,
        percent_daily_value: percent_daily_value_after(text, unit_end),
    }
}

/// Percent daily value printed after a quantity on the same line
fn percent_daily_value_after(text: &NormalizedText, unit_end: usize) -> Option<String> {
    let line_end = text.line_at(unit_end).map(|line| line.end)?;
    let rest = text.scan.get(unit_end..line_end)?;
    PERCENT_DV_REGEX.captures(rest).map(|caps| {
        let pct: String = caps["pct"].chars().filter(|c| !c.is_whitespace()).collect();
        format!("{}%", pct)
    })
}

/// Every match of `regex` whose quantity sits on the name's line, or on a later
/// line that holds nothing but the quantity and parentheticals before it.
///
/// A rejected match resumes scanning at the end of its name, so a name on the
/// quantity's own line can still claim it.
fn line_bound_captures<'t>(regex: &Regex, text: &'t NormalizedText) -> Vec<Captures<'t>> {
    let mut accepted = Vec::new();
    let mut pos = 0;
    while let Some(caps) = regex.captures_at(&text.scan, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let name_end = caps.name("gap").map_or(whole.end(), |m| m.start());
        let amount_start = caps.name("amount").map_or(whole.end(), |m| m.start());

        if crosses_into_named_line(text, name_end, amount_start) {
            trace!("Quantity in '{}' belongs to a later line", whole.as_str());
            pos = name_end.max(whole.start() + 1);
        } else {
            pos = whole.end().max(whole.start() + 1);
            accepted.push(caps);
        }
    }
    accepted
}

/// Whether the quantity at `amount_start` is on a later line than `name_end`
/// and that line names something of its own before the quantity
fn crosses_into_named_line(text: &NormalizedText, name_end: usize, amount_start: usize) -> bool {
    let (Some(name_line), Some(amount_line)) = (text.line_at(name_end), text.line_at(amount_start))
    else {
        return false;
    };
    if name_line.start == amount_line.start {
        return false;
    }
    let lead = &text.scan[amount_line.start..amount_start];
    PARENTHETICAL_REGEX
        .replace_all(lead, "")
        .chars()
        .any(char::is_alphabetic)
}

/// Whether an unclosed "(" precedes `offset` on its line
fn opens_inside_parenthesis(text: &NormalizedText, offset: usize) -> bool {
    let Some(ScanLine { start, .. }) = text.line_at(offset) else {
        return false;
    };
    let before = &text.scan[*start..offset];
    match (before.rfind('('), before.rfind(')')) {
        (Some(open), Some(close)) => open > close,
        (Some(_), None) => true,
        _ => false,
    }
}
