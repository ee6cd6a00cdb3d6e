//! tableline - restaurant dataset merge and search-index publisher
//!
//! Joins the structural (JSON) and content (CSV) restaurant datasets by
//! `objectID`, validates payment options and price ranges, and publishes the
//! merged records to an Algolia index.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;
use tableline_core::{PipelineError, ProgressContext, Verbosity};

#[derive(Parser)]
#[command(name = "tableline")]
#[command(about = "Merge restaurant datasets and publish them to a search index")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./tableline.toml or ~/.config/tableline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Decode and merge both datasets, optionally writing the result as JSON
    Merge(cmd::merge::MergeArgs),
    /// Merge both datasets and upload them to the index
    Publish(cmd::publish::PublishArgs),
    /// Make sure the index facets include the required attributes
    Facets(cmd::facets::FacetsArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = ProgressContext::new();
    let multi = progress.is_tty().then(|| progress.multi());
    tableline_core::init_logging(Verbosity::from_flags(cli.quiet, cli.debug), multi);

    let result = run(cli.command, cli.config.as_deref(), &progress);
    if let Err(err) = &result {
        report_failure(err);
    }
    result
}

/// Name the failure kind when the run was stopped by bad input or the index.
fn report_failure(err: &anyhow::Error) {
    if let Some(cause) = err
        .chain()
        .find_map(|e| e.downcast_ref::<PipelineError>())
    {
        log::error!("run failed: {}", cause.kind());
    }
}

fn run(
    command: Command,
    config_path: Option<&std::path::Path>,
    progress: &ProgressContext,
) -> Result<()> {
    let config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match command {
        Command::Merge(args) => cmd::merge::run(args, &config, progress),
        Command::Publish(args) => cmd::publish::run(args, &config, progress),
        Command::Facets(args) => cmd::facets::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec![
                "Structural dataset",
                &config.input.structural.display().to_string(),
            ]);
            table.add_row(vec![
                "Content dataset",
                &config.input.content.display().to_string(),
            ]);
            table.add_row(vec!["CSV header", &config.input.header.to_string()]);
            table.add_row(vec![
                "Missing content",
                &config.merge.missing_content.to_string(),
            ]);
            table.add_row(vec![
                "Duplicate ids",
                if config.merge.reject_duplicate_ids {
                    "reject"
                } else {
                    "last wins"
                },
            ]);
            table.add_row(vec![
                "Algolia app id",
                config.algolia.app_id.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec![
                "Algolia API key",
                if config.algolia.api_key.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec!["Index", &config.algolia.index]);
            table.add_row(vec!["Batch size", &config.algolia.batch_size.to_string()]);
            table.add_row(vec!["Max retries", &config.algolia.max_retries.to_string()]);
            table.add_row(vec![
                "Request timeout",
                &format!("{}s", config.algolia.request_timeout),
            ]);
            table.add_row(vec![
                "Wait for tasks",
                if config.algolia.wait { "yes" } else { "no" },
            ]);
            table.add_row(vec!["Facets", &config.algolia.facets.join(", ")]);
            if let Some(url) = &config.algolia.base_url {
                table.add_row(vec!["Host override", url]);
            }

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
