//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod export;

pub use artifacts::{save_artifacts, ArtifactPaths, RunManifest};
pub use export::{
    daily_means_csv, export_json, final_prices_csv, histogram_csv, import_json, markdown_summary,
    price_paths_csv, DEFAULT_HISTOGRAM_BINS,
};
