//! Artifact directory layout for a finished study.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::export::{
    daily_means_csv, export_json, final_prices_csv, histogram_csv, markdown_summary,
    price_paths_csv, short_run_id, DEFAULT_HISTOGRAM_BINS,
};
use crate::trials::StudyReport;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub schema_version: u32,
    pub timestamp: DateTime<Utc>,
    pub master_seed: u64,
    pub trials: usize,
    pub mean_closing: f64,
}

/// Paths of every file written by [`save_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub manifest: PathBuf,
    pub report: PathBuf,
    pub daily_means: PathBuf,
    pub final_prices: PathBuf,
    pub histogram: PathBuf,
    pub summary: PathBuf,
    /// Written only when the report carries price paths.
    pub price_paths: Option<PathBuf>,
}

impl ArtifactPaths {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            manifest: dir.join("manifest.json"),
            report: dir.join("report.json"),
            daily_means: dir.join("daily_means.csv"),
            final_prices: dir.join("final_prices.csv"),
            histogram: dir.join("histogram.csv"),
            summary: dir.join("summary.md"),
            price_paths: None,
        }
    }
}

/// Write the report artifacts into `<output_dir>/<run_id prefix>/`.
pub fn save_artifacts(report: &StudyReport, output_dir: &Path) -> Result<ArtifactPaths> {
    let mut paths = ArtifactPaths::new(&output_dir.join(short_run_id(&report.run_id)));
    std::fs::create_dir_all(&paths.dir)
        .with_context(|| format!("Failed to create artifact dir {}", paths.dir.display()))?;

    let manifest = RunManifest {
        run_id: report.run_id.clone(),
        schema_version: report.schema_version,
        timestamp: Utc::now(),
        master_seed: report.master_seed,
        trials: report.trials.len(),
        mean_closing: report.mean_closing,
    };
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize run manifest")?;

    write(&paths.manifest, &manifest_json)?;
    write(&paths.report, &export_json(report)?)?;
    write(&paths.daily_means, &daily_means_csv(report)?)?;
    write(&paths.final_prices, &final_prices_csv(report)?)?;
    write(&paths.histogram, &histogram_csv(report, DEFAULT_HISTOGRAM_BINS)?)?;
    write(&paths.summary, &markdown_summary(report))?;
    if report.trials.iter().any(|t| !t.price_paths.is_empty()) {
        let path = paths.dir.join("price_paths.csv");
        write(&path, &price_paths_csv(report)?)?;
        paths.price_paths = Some(path);
    }

    tracing::info!(dir = %paths.dir.display(), "artifacts saved");
    Ok(paths)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
