//! Facets subcommand - reconcile attributesForFaceting without uploading records

use anyhow::{Context, Result};
use clap::Args;
use tableline_core::FacetUpdate;

use super::IndexArgs;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FacetsArgs {
    #[command(flatten)]
    pub index: IndexArgs,

    /// Extra attribute to require (repeatable)
    #[arg(long = "facet")]
    pub extra: Vec<String>,
}

pub fn run(args: FacetsArgs, config: &Config) -> Result<()> {
    let client = args.index.client(config, None)?;

    let mut required = super::facet_list(config);
    required.extend(args.extra.iter().map(String::as_str));

    let update = tableline_core::ensure_facets(&client, &required)
        .with_context(|| format!("Failed to update settings of {}", client.index_name()))?;
    match update {
        FacetUpdate::UpToDate => println!("{}: facets up to date", client.index_name()),
        FacetUpdate::Updated { attributes, task_id } => println!(
            "{}: facets set to [{}] (task {task_id})",
            client.index_name(),
            attributes.join(", ")
        ),
    }
    Ok(())
}
