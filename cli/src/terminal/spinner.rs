use colored::*;
use indicatif::ProgressStyle;
use mncreach_common::config::Config;
use mncreach_core::enrich::{EnrichSummary, OnRow};
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {elapsed:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Turns the span's progress bar into the row spinner.
pub fn attach(span: &Span, enricher: &str, cfg: &Config) {
    span.pb_set_style(&spinner_style());
    span.pb_set_message(&format!(
        "{} {}",
        enricher.bold(),
        cfg.input.display().to_string().dimmed()
    ));
}

/// Progress callback that keeps the spinner message up to date.
pub fn row_progress(span: Span) -> OnRow {
    Box::new(move |summary: &EnrichSummary| {
        span.pb_set_message(&progress_message(summary));
    })
}

fn progress_message(summary: &EnrichSummary) -> String {
    format!(
        "Processed {} rows, {} enriched so far...",
        summary.rows.to_string().bold(),
        summary.enriched.to_string().green().bold()
    )
}
