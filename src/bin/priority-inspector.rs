//! # Priority Inspector
//!
//! Loads resolver configuration for an environment, validates it, and prints
//! the source priority list each edition would resolve against.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use edition_resolver::config::ConfigManager;
use edition_resolver::sources::{PriorityBuilder, PriorityCache, SourceRegistry};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "priority-inspector")]
#[command(about = "Show source priority lists for editions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Environment overlay to apply (resolver.<environment>.yaml)
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Directory holding resolver.yaml (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Editions or aliases to inspect (default: every declared source)
    editions: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    if let Err(e) = run(&cli) {
        error!("Priority inspection failed: {e:#}");
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let manager =
        ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &cli.environment)
            .context("loading resolver configuration")?;

    let registry = Arc::new(SourceRegistry::from_config(manager.config()));
    let builder = PriorityBuilder::new(Arc::clone(&registry), Arc::new(PriorityCache::new()));

    let editions: Vec<String> = if cli.editions.is_empty() {
        registry.sources().map(ToString::to_string).collect()
    } else {
        cli.editions.clone()
    };

    let rows: Vec<(String, Vec<String>)> = editions
        .iter()
        .map(|edition| {
            let list = builder.build_priority(edition);
            (
                edition.clone(),
                list.iter().map(ToString::to_string).collect(),
            )
        })
        .collect();

    match cli.format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "environment": manager.environment(),
                "signature": registry.signature(),
                "priorities": rows
                    .iter()
                    .map(|(edition, sources)| serde_json::json!({
                        "edition": edition,
                        "resolved_primary": registry.resolve_alias(edition),
                        "sources": sources,
                    }))
                    .collect::<Vec<_>>(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("rendering report")?
            );
        }
        OutputFormat::Table => {
            println!("Environment: {}", manager.environment());
            println!("Signature:   {}", registry.signature());
            println!();
            let width = rows.iter().map(|(edition, _)| edition.len()).max().unwrap_or(0);
            for (edition, sources) in &rows {
                let order = if sources.is_empty() {
                    "(no configured sources)".to_string()
                } else {
                    sources.join(" -> ")
                };
                println!("{edition:<width$}  {order}");
            }
        }
    }

    Ok(())
}
