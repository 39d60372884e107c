//! CORD Explorer - batch report and interactive viewer for paper metadata

mod gui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cord_explorer::config::{ExplorerConfig, Overrides};
use cord_explorer::data::DataLoader;
use cord_explorer::report::{Report, ReportOptions};
use eframe::egui;
use gui::ExplorerApp;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Explore research-paper metadata by publication year
#[derive(Parser, Debug)]
#[command(name = "cord_explorer", version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ./cord-explorer.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a metadata CSV and optionally write charts
    Report {
        /// Metadata CSV file
        csv: PathBuf,

        /// First year to include (default: oldest dated paper)
        #[arg(long)]
        from: Option<i32>,

        /// Last year to include (default: newest dated paper)
        #[arg(long)]
        to: Option<i32>,

        /// Number of journals to rank
        #[arg(long)]
        top_venues: Option<usize>,

        /// Number of title words to list
        #[arg(long)]
        top_terms: Option<usize>,

        /// Directory receiving the chart images and summary.json
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Print the summary as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Open the interactive explorer
    Explore {
        /// Metadata CSV file to open on startup
        csv: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ExplorerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Command::Report {
            csv,
            from,
            to,
            top_venues,
            top_terms,
            out_dir,
            json,
        } => {
            config.apply_overrides(Overrides {
                data_path: Some(csv.clone()),
                top_venues,
                top_terms,
            });
            run_report(&config, csv, (from, to), out_dir, json)
        }
        Command::Explore { csv } => {
            config.apply_overrides(Overrides {
                data_path: csv,
                ..Overrides::default()
            });
            run_explorer(config)
        }
    }
}

fn run_report(
    config: &ExplorerConfig,
    csv: PathBuf,
    (from, to): (Option<i32>, Option<i32>),
    out_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let raw = DataLoader::load_csv(&csv).with_context(|| format!("failed to load {}", csv.display()))?;
    let options = ReportOptions {
        from,
        to,
        top_venues: config.views.top_venues,
        top_terms: config.views.top_terms,
        preview_rows: config.views.preview_rows,
    };
    let report = Report::generate(&raw, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    if let Some(dir) = out_dir {
        let written = report
            .write_artifacts(&dir, &config.charts, &config.wordcloud)
            .with_context(|| format!("failed to write report to {}", dir.display()))?;
        for path in written {
            info!(path = %path.display(), "wrote");
        }
    }
    Ok(())
}

fn run_explorer(config: ExplorerConfig) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("CORD Explorer"),
        ..Default::default()
    };

    eframe::run_native(
        "CORD Explorer",
        options,
        Box::new(|cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("explorer window failed: {e}"))
}
