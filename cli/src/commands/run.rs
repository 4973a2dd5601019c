use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::{Instrument, info_span};

use crate::{
    mprint,
    terminal::{colors, print, spinner},
};
use mncreach_common::{config::Config, error, warn};
use mncreach_core::enrich::{self, EnrichSummary, RowEnricher};

/// Streams the configured input through `enricher` into the output file.
///
/// Problems with the input file are reported and end the run normally.
pub async fn run(enricher: &dyn RowEnricher, cfg: &Config) -> anyhow::Result<()> {
    print::header(&format!("{} enrichment", enricher.name()), cfg.quiet);
    if cfg.quiet == 0 {
        print::aligned_line("Input", cfg.input.display().to_string());
        print::aligned_line("Output", cfg.output.display().to_string());
        print::aligned_line("Adds", enricher.output_columns().join(", "));
        print::aligned_line("Row timeout", format!("{}s", cfg.probe.row_timeout.as_secs()));
    }

    let span = info_span!("enrich", indicatif.pb_show = true);
    spinner::attach(&span, enricher.name(), cfg);

    let start_time: Instant = Instant::now();
    let result = enrich::enrich_file(
        &cfg.input,
        &cfg.output,
        enricher,
        cfg.probe.row_timeout,
        Some(spinner::row_progress(span.clone())),
    )
    .instrument(span)
    .await;

    match result {
        Ok(summary) => {
            enrichment_ends(&summary, start_time.elapsed(), cfg);
            Ok(())
        }
        Err(e) if e.is_input_problem() => {
            error!("{e}");
            warn!("{} was left unchanged", cfg.output.display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("{} enrichment failed", enricher.name())),
    }
}

fn enrichment_ends(summary: &EnrichSummary, total_time: Duration, cfg: &Config) {
    if cfg.quiet == 0 {
        print::header("Summary", cfg.quiet);
        print::aligned_line("Rows", summary.rows.to_string());
        print::aligned_line("Enriched", summary.enriched.to_string().green().bold());
        print::aligned_line("Not found", summary.not_found.to_string());
        print::aligned_line("Already done", summary.already_done.to_string());
        print::aligned_line("Skipped", summary.skipped.to_string());
        if summary.timed_out > 0 {
            print::aligned_line("Timed out", summary.timed_out.to_string().yellow().bold());
        }
    }
    print_summary(summary, total_time, cfg);
}

fn print_summary(summary: &EnrichSummary, total_time: Duration, cfg: &Config) {
    let rows: ColoredString = format!("{} rows", summary.rows).bold().color(colors::ACCENT);
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Enrichment Complete: {rows} written in {total_time}");

    match cfg.quiet {
        0 => {
            print::fat_separator();
            let plain = format!("Output saved to {}", cfg.output.display());
            print::centerln(&plain, |s| s.color(colors::TEXT_DEFAULT).to_string());
            print::print(&output);
            print::end_of_program();
        }
        _ => {
            mprint!(&output);
        }
    }
}
