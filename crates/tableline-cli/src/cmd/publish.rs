//! Publish subcommand - merge both datasets and push them to Algolia

use anyhow::{Context, Result};
use clap::Args;
use tableline_core::{FacetUpdate, ProgressContext};

use super::{IndexArgs, InputArgs};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub index: IndexArgs,

    /// Records per batch request
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Merge and validate only; don't contact Algolia
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: PublishArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    // Credentials are checked before any work is done
    let client = if args.dry_run {
        None
    } else {
        Some(args.index.client(config, args.batch_size)?)
    };

    let pipeline = args.input.pipeline_config(config);
    let stage = progress.stage_line("merge");
    stage.set_message("decoding and joining datasets");
    let (records, summary) =
        tableline_core::load_and_merge(&pipeline).context("Failed to merge datasets")?;
    stage.finish_and_clear();
    super::print_merge_summary(&summary);

    let Some(client) = client else {
        log::info!("Dry run: {} records ready, nothing published", records.len());
        return Ok(());
    };

    let index_name = client.index_name().to_string();
    let client = client.with_progress(progress.upload_bar(records.len() as u64));
    let facets = super::facet_list(config);
    let result = tableline_core::publish(&records, &client, &facets)
        .with_context(|| format!("Failed to publish to index {index_name}"))?;

    progress.println(format!(
        "Published {} records to {index_name} in {} batches",
        result.records,
        result.task_ids.len()
    ));
    if let FacetUpdate::Updated { attributes, task_id } = &result.facets {
        progress.println(format!(
            "Facets updated (task {task_id}): {}",
            attributes.join(", ")
        ));
    }
    Ok(())
}
