//! Report export: JSON, CSV, and Markdown.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: daily mean series, sorted final prices, histogram bins, and
//!   (when kept) per-instrument price paths for external plotting tools
//! - **Markdown**: human-readable per-trial summary
//!
//! Unknown (newer) schema versions are rejected on load.

use anyhow::{bail, Context, Result};
use stocksim_core::stats::histogram;

use crate::trials::{StudyReport, SCHEMA_VERSION};

/// Bin count of the end-of-run distribution view.
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &StudyReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize StudyReport to JSON")
}

/// Deserialize a `StudyReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<StudyReport> {
    let report: StudyReport =
        serde_json::from_str(json).context("failed to deserialize StudyReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: trial, day, mean_price
pub fn daily_means_csv(report: &StudyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trial", "day", "mean_price"])?;
    for t in &report.trials {
        for (day, mean) in t.daily_means.iter().enumerate() {
            wtr.write_record([t.trial.to_string(), day.to_string(), format!("{mean:.6}")])?;
        }
    }
    finish(wtr)
}

/// Columns: trial, rank, price. Prices are sorted ascending within each trial.
pub fn final_prices_csv(report: &StudyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trial", "rank", "price"])?;
    for t in &report.trials {
        let mut sorted = t.final_prices.clone();
        sorted.sort_by(f64::total_cmp);
        for (rank, price) in sorted.iter().enumerate() {
            wtr.write_record([t.trial.to_string(), rank.to_string(), format!("{price:.6}")])?;
        }
    }
    finish(wtr)
}

/// Columns: trial, bin_start, bin_end, count
pub fn histogram_csv(report: &StudyReport, bins: usize) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trial", "bin_start", "bin_end", "count"])?;
    for t in &report.trials {
        for bin in histogram(&t.final_prices, bins) {
            wtr.write_record([
                t.trial.to_string(),
                format!("{:.6}", bin.start),
                format!("{:.6}", bin.end),
                bin.count.to_string(),
            ])?;
        }
    }
    finish(wtr)
}

/// Columns: trial, instrument, day, price. Day 0 is the initial price.
pub fn price_paths_csv(report: &StudyReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trial", "instrument", "day", "price"])?;
    for t in &report.trials {
        for path in &t.price_paths {
            for (day, price) in path.prices.iter().enumerate() {
                wtr.write_record([
                    t.trial.to_string(),
                    path.instrument.clone(),
                    day.to_string(),
                    format!("{price:.6}"),
                ])?;
            }
        }
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

// ─── Markdown ───────────────────────────────────────────────────────

/// Leading 12 characters of a run id, cut on a character boundary.
pub(crate) fn short_run_id(run_id: &str) -> &str {
    match run_id.char_indices().nth(12) {
        Some((idx, _)) => &run_id[..idx],
        None => run_id,
    }
}

pub fn markdown_summary(report: &StudyReport) -> String {
    let c = &report.config;
    let mut md = String::new();

    md.push_str(&format!("# Simulation report `{}`\n\n", short_run_id(&report.run_id)));
    let momentum = if c.momentum_enabled {
        format!("on (scale {})", c.momentum_scale)
    } else {
        "off".to_string()
    };
    md.push_str(&format!(
        "{} sector(s) × {} stocks, {} days, baseline bias {:.6}, volatility ≤ {:.4}, momentum {}\n\n",
        c.num_groups, c.group_size, c.num_days, c.baseline_bias, c.volatility_upper_bound, momentum,
    ));
    md.push_str("| Trial | Closing mean | Median | Stdev | Min | Max | Delisted |\n");
    md.push_str("|---:|---:|---:|---:|---:|---:|---:|\n");
    for t in &report.trials {
        let s = &t.summary;
        md.push_str(&format!(
            "| {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} | {}/{} |\n",
            t.trial,
            t.closing_mean(),
            s.median,
            s.stdev,
            s.min,
            s.max,
            s.delisted,
            s.count
        ));
    }
    md.push_str(&format!(
        "\nMean closing over {} trial(s): **{:.4}**\n",
        report.trials.len(),
        report.mean_closing
    ));
    md
}
