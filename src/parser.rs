//! # Supplement Facts Parser
//!
//! The single entry point from raw OCR text to an [`ExtractionResult`]. A parse
//! runs four stages in order:
//!
//! 1. context detection on the original-case lines (product name, serving size)
//! 2. normalization into the scan view (whitespace, case, OCR substitutions)
//! 3. candidate matching (lexical, composite, fallback tiers)
//! 4. assembly (name cleanup, rejection, merging, deduplication)
//!
//! Parsing is synchronous and keeps no state between calls, so one parser can be
//! shared across threads.

use std::time::Instant;

use tracing::info;

use crate::deduplication;
use crate::errors::AppResult;
use crate::ingredient_matcher::IngredientMatcher;
use crate::normalization::NormalizedText;
use crate::observability;
use crate::parser_config::ParserConfig;
use crate::section_detection;
use crate::types::ExtractionResult;

/// Rule-based parser for Supplement Facts OCR text
#[derive(Debug, Clone)]
pub struct SupplementFactsParser {
    config: ParserConfig,
    matcher: IngredientMatcher,
}

impl Default for SupplementFactsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SupplementFactsParser {
    /// Create a parser with the default configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use supplement_facts::parser::SupplementFactsParser;
    ///
    /// let parser = SupplementFactsParser::new();
    /// let result = parser.parse("vitamin c (as ascorbic acid) 1g (1,000 mg)");
    ///
    /// assert!(result.success);
    /// assert_eq!(result.ingredients[0].name, "Vitamin C");
    /// assert_eq!(result.ingredients[0].amount, "1");
    /// assert_eq!(result.ingredients[0].unit, "G");
    /// ```
    pub fn new() -> Self {
        let config = ParserConfig::default();
        Self {
            matcher: IngredientMatcher::new(config.enable_composite, config.enable_fallback),
            config,
        }
    }

    /// Create a parser with a validated custom configuration
    pub fn with_config(config: ParserConfig) -> AppResult<Self> {
        config.validate()?;
        info!(
            defaults = %config.defaults.product_name,
            unit_case = ?config.unit_case,
            composite = config.enable_composite,
            fallback = config.enable_fallback,
            "Creating SupplementFactsParser with custom config"
        );
        Ok(Self {
            matcher: IngredientMatcher::new(config.enable_composite, config.enable_fallback),
            config,
        })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Extract the ingredient list from raw OCR text.
    ///
    /// Never fails: text without recognizable ingredients yields a successful
    /// result with an empty ingredient list.
    pub fn parse(&self, raw_text: &str) -> ExtractionResult {
        let span = observability::parser_span("parse");
        let _guard = span.enter();
        let start_time = Instant::now();

        let lines: Vec<&str> = raw_text.lines().collect();
        let context = section_detection::detect_context(&lines, &self.config.defaults);
        let normalized = NormalizedText::from_raw(raw_text);
        let candidates = self.matcher.find_candidates(&normalized);
        let result = deduplication::assemble(raw_text, candidates, context, &self.config);

        let duration = start_time.elapsed();
        observability::record_extraction_metrics(
            result.method,
            result.success,
            duration,
            raw_text.len(),
            lines.len(),
            result.ingredients.len(),
        );

        info!(
            product_name = %result.product_name,
            ingredients = result.ingredients.len(),
            duration_ms = duration.as_millis() as u64,
            "Extracted supplement facts"
        );
        result
    }
}
