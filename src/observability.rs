//! Observability module for logging, tracing spans, and metrics.
//!
//! This module provides:
//! - Structured logging with a JSON or pretty layer
//! - Prometheus metrics recorder installation
//! - Span and metric helpers used by the extraction pipeline
//!
//! Metric helpers record through the `metrics` facade and are no-ops when no
//! recorder is installed.

use std::time::Duration;

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;
use crate::types::ExtractionMethod;

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("supplement_facts={}", config.log_level.to_lowercase()).parse()?);

    // Logs go to stderr so stdout carries only the JSON result
    if config.uses_pretty_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        log_format = %config.log_format,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Install the Prometheus recorder with the configured global labels
pub fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<PrometheusHandle> {
    let builder = config
        .tags
        .iter()
        .fold(PrometheusBuilder::new(), |builder, (key, value)| {
            builder.add_global_label(key.clone(), value.clone())
        });
    let handle = builder.install_recorder()?;

    tracing::info!(
        metrics_enabled = %config.enable_metrics_export,
        global_labels = config.tags.len(),
        "Metrics collection initialized"
    );
    Ok(handle)
}

/// Create a span for one extraction
pub fn parser_span(operation: &str) -> tracing::Span {
    tracing::info_span!("parser_operation", operation = operation, component = "parser")
}

/// Record the outcome of one extraction
pub fn record_extraction_metrics(
    method: ExtractionMethod,
    success: bool,
    duration: Duration,
    input_length: usize,
    line_count: usize,
    ingredients_found: usize,
) {
    metrics::counter!(
        "extraction_operations_total",
        "method" => method.as_str(),
        "result" => if success { "success" } else { "failure" }
    )
    .increment(1);
    metrics::histogram!("extraction_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("extraction_input_length").record(input_length as f64);
    metrics::histogram!("extraction_line_count").record(line_count as f64);
    metrics::histogram!("extraction_ingredients_found").record(ingredients_found as f64);
}

/// Record how many candidates one matching tier produced
pub fn record_candidate_metrics(tier: &'static str, count: usize) {
    metrics::counter!("extraction_candidates_total", "tier" => tier).increment(count as u64);
}

/// Record a candidate that did not become an ingredient
pub fn record_rejected_candidate(reason: &'static str) {
    metrics::counter!("extraction_rejected_candidates_total", "reason" => reason).increment(1);
}
