//! Stocksim CLI: run stock-market simulations.
//!
//! Commands:
//! - `run`: simulate from a TOML config file or named preset
//! - `records`: simulate a uniform and a Gaussian study per line of a
//!   parameter-records file
//! - `preset`: print a named preset as TOML

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use stocksim_runner::{
    default_template, load_records, run_trials, save_artifacts, SimulationConfig, StudyReport,
    TrialOptions, PRESET_NAMES,
};

#[derive(Parser)]
#[command(name = "stocksim", about = "Stocksim CLI, a sector drift and regime-shift stock simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate from a TOML config file or named preset.
    Run {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Named preset: sector_study, daily_bias_study, random_walk_study.
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        opts: TrialArgs,
    },
    /// Simulate each `days,instruments,bias,momentum` record under uniform and
    /// Gaussian shocks.
    Records {
        /// Path to the records file.
        #[arg(long)]
        file: PathBuf,

        /// TOML config supplying fields the records do not carry.
        #[arg(long)]
        template: Option<PathBuf>,

        #[command(flatten)]
        opts: TrialArgs,
    },
    /// Print a named preset as TOML.
    Preset {
        /// Preset name.
        name: String,
    },
}

#[derive(clap::Args)]
struct TrialArgs {
    /// Number of independent trials.
    #[arg(long, default_value_t = 3)]
    trials: usize,

    /// Master seed for the per-trial RNG hierarchy.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run trials on one thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Write report artifacts under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Keep every stock's price path and write price_paths.csv with the artifacts.
    #[arg(long, default_value_t = false)]
    keep_histories: bool,
}

impl TrialArgs {
    fn options(&self) -> TrialOptions {
        TrialOptions {
            trials: self.trials,
            master_seed: self.seed,
            parallel: !self.sequential,
            keep_histories: self.keep_histories,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, preset, opts } => run_cmd(config, preset, &opts),
        Commands::Records { file, template, opts } => records_cmd(&file, template, &opts),
        Commands::Preset { name } => {
            let config = SimulationConfig::preset(&name)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn run_cmd(config: Option<PathBuf>, preset: Option<String>, args: &TrialArgs) -> Result<()> {
    let config = match (config, preset) {
        (Some(path), _) => SimulationConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        (None, Some(name)) => SimulationConfig::preset(&name)?,
        (None, None) => bail!("pass --config <FILE> or --preset <{}>", PRESET_NAMES.join("|")),
    };

    let report = run_trials(&config, &args.options())?;
    print_summary(&report);
    save_if_requested(&report, args.output_dir.as_deref())
}

fn records_cmd(file: &Path, template: Option<PathBuf>, args: &TrialArgs) -> Result<()> {
    let template = match template {
        Some(path) => SimulationConfig::from_file(&path)
            .with_context(|| format!("Failed to load template {}", path.display()))?,
        None => default_template(),
    };
    let records = load_records(file, &template)
        .with_context(|| format!("Failed to load records {}", file.display()))?;
    info!(records = records.len(), "loaded parameter records");

    for (i, record) in records.iter().enumerate() {
        for (shocks, config) in record.studies() {
            println!("--- Record {} (line {}), {shocks} shocks ---", i + 1, record.line);
            let report = run_trials(config, &args.options())?;
            print_summary(&report);
            save_if_requested(&report, args.output_dir.as_deref())?;
        }
    }
    Ok(())
}

fn print_summary(report: &StudyReport) {
    let c = &report.config;
    println!("Testing model on {} days", c.num_days);
    println!(
        "Sectors: {}  Stocks per sector: {}  Trials: {}  Seed: {}",
        c.num_groups,
        c.group_size,
        report.trials.len(),
        report.master_seed
    );
    for t in &report.trials {
        println!(
            "  trial {:>2}: closing mean {:>10.4}  median {:>10.4}  delisted {}/{}",
            t.trial,
            t.closing_mean(),
            t.summary.median,
            t.summary.delisted,
            t.summary.count
        );
    }
    println!("Mean closing with {} sectors is: {:.4}", c.num_groups, report.mean_closing);
}

fn save_if_requested(report: &StudyReport, output_dir: Option<&Path>) -> Result<()> {
    if let Some(dir) = output_dir {
        let paths = save_artifacts(report, dir)?;
        println!("Artifacts saved to: {}", paths.dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_preset_and_trial_flags() {
        let cli = Cli::try_parse_from([
            "stocksim", "run", "--preset", "sector_study", "--trials", "5", "--seed", "9",
            "--sequential",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { preset, opts, .. } => {
                assert_eq!(preset.as_deref(), Some("sector_study"));
                let options = opts.options();
                assert_eq!(options.trials, 5);
                assert_eq!(options.master_seed, 9);
                assert!(!options.parallel);
                assert!(!options.keep_histories);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn records_accepts_keep_histories() {
        let cli = Cli::try_parse_from([
            "stocksim", "records", "--file", "params.txt", "--keep-histories",
        ])
        .unwrap();
        match cli.command {
            Commands::Records { opts, .. } => assert!(opts.options().keep_histories),
            _ => panic!("expected records command"),
        }
    }

    #[test]
    fn config_and_preset_conflict() {
        let res = Cli::try_parse_from([
            "stocksim", "run", "--config", "a.toml", "--preset", "sector_study",
        ]);
        assert!(res.is_err());
    }
}
