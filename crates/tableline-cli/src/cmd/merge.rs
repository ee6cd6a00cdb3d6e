//! Merge subcommand - decode and join both datasets without publishing

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tableline_core::ProgressContext;

use super::InputArgs;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write merged index rows to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: MergeArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let pipeline = args.input.pipeline_config(config);

    let stage = progress.stage_line("merge");
    stage.set_message("decoding and joining datasets");
    let (records, summary) =
        tableline_core::load_and_merge(&pipeline).context("Failed to merge datasets")?;
    stage.finish_and_clear();

    if let Some(output) = &args.output {
        let n = tableline_core::write_json(output, &records)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        log::info!("Wrote {n} records to {}", output.display());
    }

    super::print_merge_summary(&summary);
    Ok(())
}
