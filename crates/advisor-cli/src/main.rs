//! Command-line interface for stock-advisor
//!
//! ```bash
//! # Score snapshot files
//! advisor analyze data/AAPL.json data/MSFT.json --detail
//!
//! # Score symbols from a directory of <SYMBOL>.json files
//! advisor analyze --data-dir data --symbol AAPL --symbol MSFT --format csv
//!
//! # Show effective analyzer weights
//! advisor analyzers --config advisor.json
//! ```

mod formatter;

use advisor_analyzers::{
    AnalysisEngine, AnalyzerRegistry, BatchOutcome, JsonDirectorySource, read_snapshot,
};
use advisor_core::AdvisorConfig;
use advisor_utils::Settings;
use anyhow::Context;
use clap::{Parser, Subcommand};
use formatter::OutputFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "advisor")]
#[command(about = "Composite stock scoring from market snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one or more stock snapshots
    Analyze {
        /// Snapshot JSON files
        files: Vec<PathBuf>,

        /// Directory holding <SYMBOL>.json snapshots
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Symbols to load from --data-dir
        #[arg(long = "symbol", requires = "data_dir")]
        symbols: Vec<String>,

        /// Configuration file (overrides ADVISOR_CONFIG and the default locations)
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Include per-analyzer breakdowns and reasoning
        #[arg(long)]
        detail: bool,

        /// Run analyzers on the blocking thread pool
        #[arg(long)]
        concurrent: bool,
    },
    /// List analyzers with their effective settings
    Analyzers {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

fn load_config(explicit: Option<&Path>, settings: &Settings) -> anyhow::Result<AdvisorConfig> {
    let config = match explicit.or(settings.config_path.as_deref()) {
        Some(path) => AdvisorConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => AdvisorConfig::load_merged().context("loading configuration")?,
    };
    Ok(config)
}

async fn analyze_files(
    engine: &AnalysisEngine,
    files: &[PathBuf],
    concurrent: bool,
) -> Vec<BatchOutcome> {
    let mut outcomes = Vec::with_capacity(files.len());
    for path in files {
        let label = path.display().to_string();
        let result = match read_snapshot(path).await {
            Ok(snapshot) if concurrent => engine.analyze_concurrent(Arc::new(snapshot)).await,
            Ok(snapshot) => engine.analyze(&snapshot),
            Err(e) => Err(e),
        };
        let symbol = result.as_ref().map_or(label, |r| r.symbol.clone());
        outcomes.push(BatchOutcome { symbol, result });
    }
    outcomes
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    advisor_utils::init_tracing_with(settings.log_format);

    let cli = Cli::parse();
    info!(app = %settings.app_name, "Starting");

    match cli.command {
        Commands::Analyze {
            files,
            data_dir,
            symbols,
            config,
            format,
            detail,
            concurrent,
        } => {
            if files.is_empty() && symbols.is_empty() {
                anyhow::bail!("nothing to analyze: pass snapshot files or --data-dir with --symbol");
            }

            let config = load_config(config.as_deref(), &settings)?;
            let engine = AnalysisEngine::from_config(&config)?;

            let mut outcomes = analyze_files(&engine, &files, concurrent).await;
            if let Some(dir) = data_dir {
                let source = JsonDirectorySource::new(dir);
                outcomes.extend(engine.analyze_batch(&source, &symbols).await);
            }

            print!("{}", format.formatter().format_outcomes(&outcomes, detail)?);

            if outcomes.iter().all(|o| o.result.is_err()) {
                anyhow::bail!("every analysis failed");
            }
        }
        Commands::Analyzers { config, format } => {
            let config = load_config(config.as_deref(), &settings)?;
            let registry = AnalyzerRegistry::standard(config.classifier()?)?;
            let resolved = registry.resolve(&config);
            print!("{}", format.formatter().format_analyzers(&resolved)?);
        }
    }

    Ok(())
}
