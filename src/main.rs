//! Pocket-Clipper main entry point
//!
//! This is the command-line interface for turning a Pocket export into
//! Markdown clippings.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pocket_clipper::config::{load_config_with_hash, Config};
use pocket_clipper::crawler::crawl;
use pocket_clipper::links::import_links;
use pocket_clipper::output::{clear_output_dir, print_summary, ResultsWriter};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Pocket-Clipper: turns a Pocket export into Markdown clippings
///
/// Every bookmarked page is fetched, converted to Markdown with a
/// front-matter header, and written under `<output>/clippings`. Links that
/// fail are listed in a CSV report next to it.
#[derive(Parser, Debug)]
#[command(name = "pocket-clipper")]
#[command(version = "1.0.0")]
#[command(about = "Turns a Pocket export into Markdown clippings", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a Pocket export and write one clipping per link
    Import {
        /// Path to the Pocket CSV export
        #[arg(short, long, value_name = "CSV")]
        file: PathBuf,

        /// Directory receiving the clippings and the failure report
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Optional TOML configuration file
        #[arg(short, long, value_name = "TOML")]
        config: Option<PathBuf>,

        /// Maximum links processed at once (0 = unbounded)
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
    },

    /// Remove an output directory and everything in it
    Clear {
        /// The output directory to clear
        #[arg(short, long, value_name = "DIR", default_value = "./exported")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Import {
            file,
            output,
            config,
            concurrency,
        } => {
            let mut config = load_or_default_config(config.as_deref())?;
            if let Some(output) = output {
                config.output.base_dir = output.to_string_lossy().into_owned();
            }
            if let Some(concurrency) = concurrency {
                config.crawler.max_concurrent_fetches = concurrency;
            }
            pocket_clipper::config::validate(&config)?;

            handle_import(&file, config).await
        }
        Command::Clear { output } => handle_clear(&output),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pocket_clipper=info,warn"),
            1 => EnvFilter::new("pocket_clipper=debug,info"),
            _ => EnvFilter::new("pocket_clipper=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_or_default_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the import command: crawl every link, then report
async fn handle_import(file: &Path, config: Config) -> anyhow::Result<()> {
    let links = import_links(file)?;
    println!(
        "Importing {} links from Pocket export file {}...",
        links.len(),
        file.display()
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling in-flight fetches");
            on_interrupt.cancel();
        }
    });

    let outcomes = match crawl(&config, links, &cancel).await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let base_dir = PathBuf::from(&config.output.base_dir);
    let results_writer = ResultsWriter::new(base_dir.join(&config.output.report_file));
    let summary = results_writer.write_results(&outcomes)?;

    print_summary(&summary);
    if summary.failed > 0 {
        println!("Failed links written to {}", results_writer.path().display());
    }
    println!(
        "All links visited and markdown files created at {}",
        base_dir.display()
    );

    Ok(())
}

/// Handles the clear command
fn handle_clear(output: &Path) -> anyhow::Result<()> {
    let cleared = clear_output_dir(output)
        .with_context(|| format!("Error clearing directory {}", output.display()))?;
    println!("Successfully cleared directory: {}", cleared.display());
    Ok(())
}
