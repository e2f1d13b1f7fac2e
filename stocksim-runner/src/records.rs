//! Ordered text-line parameter records.
//!
//! Each non-empty line is `days,instruments,bias,momentum` where `momentum`
//! is an integer flag (non-zero enables momentum). A line describes one
//! single-sector market studied under two shock families: uniform shocks of
//! width `v`, and Gaussian shocks with standard deviation `v / 2`, where `v`
//! is each instrument's drawn volatility. Every other field comes from a
//! template.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;

use stocksim_core::{ShockKind, SimError};

use crate::config::SimulationConfig;

const FIELD_COUNT: usize = 4;

/// Gaussian shock width relative to the uniform half-width.
pub const GAUSSIAN_SHOCK_SCALE: f64 = 0.5;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("read records: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse records: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: expected 4 fields, found {found}")]
    FieldCount { line: u64, found: usize },
    #[error("line {line}: bad {field} '{value}'")]
    Field { line: u64, field: &'static str, value: String },
    #[error("line {line}: {source}")]
    Invalid {
        line: u64,
        #[source]
        source: SimError,
    },
    #[error("no parameter records found")]
    Empty,
}

/// One parsed line: the same market under uniform and Gaussian shocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRecord {
    /// 1-based line number in the source.
    pub line: u64,
    pub uniform: SimulationConfig,
    pub gaussian: SimulationConfig,
}

impl ParameterRecord {
    /// Both studies, labelled by shock family.
    pub fn studies(&self) -> [(&'static str, &SimulationConfig); 2] {
        [("uniform", &self.uniform), ("gaussian", &self.gaussian)]
    }
}

/// Template used for fields a record does not carry.
pub fn default_template() -> SimulationConfig {
    SimulationConfig::random_walk_study()
}

pub fn load_records(path: &Path, template: &SimulationConfig) -> Result<Vec<ParameterRecord>, RecordError> {
    let content = std::fs::read_to_string(path)?;
    parse_records(&content, template)
}

pub fn parse_records(
    content: &str,
    template: &SimulationConfig,
) -> Result<Vec<ParameterRecord>, RecordError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.iter().all(str::is_empty) {
            continue;
        }
        records.push(parse_record(&record, line, template)?);
    }

    if records.is_empty() {
        return Err(RecordError::Empty);
    }
    Ok(records)
}

fn parse_record(
    record: &StringRecord,
    line: u64,
    template: &SimulationConfig,
) -> Result<ParameterRecord, RecordError> {
    if record.len() != FIELD_COUNT {
        return Err(RecordError::FieldCount { line, found: record.len() });
    }

    let bad = |idx: usize, field: &'static str| RecordError::Field {
        line,
        field,
        value: record[idx].to_string(),
    };

    let num_days: usize = record[0].parse().map_err(|_| bad(0, "day count"))?;
    let group_size: usize = record[1].parse().map_err(|_| bad(1, "instrument count"))?;
    let baseline_bias: f64 = record[2].parse().map_err(|_| bad(2, "bias"))?;
    let momentum_flag: i64 = record[3].parse().map_err(|_| bad(3, "momentum flag"))?;

    let uniform = SimulationConfig {
        num_days,
        num_groups: 1,
        group_size,
        baseline_bias,
        momentum_enabled: momentum_flag != 0,
        shock_kind: ShockKind::Uniform,
        shock_scale: 1.0,
        ..template.clone()
    };
    let gaussian = SimulationConfig {
        shock_kind: ShockKind::Gaussian,
        shock_scale: GAUSSIAN_SHOCK_SCALE,
        ..uniform.clone()
    };
    for config in [&uniform, &gaussian] {
        config.validate().map_err(|source| RecordError::Invalid { line, source })?;
    }
    Ok(ParameterRecord { line, uniform, gaussian })
}
