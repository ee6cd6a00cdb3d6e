pub mod facets;
pub mod merge;
pub mod publish;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tableline_algolia::{AlgoliaClient, ClientConfig, Credentials};
use tableline_core::{HeaderMode, MergeOptions, MergeSummary, MissingContent, PipelineConfig};

use crate::config::Config;

/// Dataset locations and merge policy, shared by `merge` and `publish`.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Structural dataset (JSON array of restaurants)
    #[arg(long)]
    pub structural: Option<PathBuf>,

    /// Content dataset (semicolon-delimited CSV)
    #[arg(long)]
    pub content: Option<PathBuf>,

    /// First CSV row: auto, present or absent
    #[arg(long)]
    pub header: Option<HeaderMode>,

    /// Restaurants without content: fail, drop or keep
    #[arg(long)]
    pub missing_content: Option<MissingContent>,

    /// Let the last of several records sharing an objectID win instead of failing
    #[arg(long)]
    pub allow_duplicate_ids: bool,
}

impl InputArgs {
    /// Config file defaults, CLI overrides.
    pub fn pipeline_config(&self, config: &Config) -> PipelineConfig {
        PipelineConfig {
            structural_path: self
                .structural
                .clone()
                .unwrap_or_else(|| config.input.structural.clone()),
            content_path: self
                .content
                .clone()
                .unwrap_or_else(|| config.input.content.clone()),
            header: self.header.unwrap_or(config.input.header),
            merge: MergeOptions {
                reject_duplicate_ids: !self.allow_duplicate_ids
                    && config.merge.reject_duplicate_ids,
                missing_content: self
                    .missing_content
                    .unwrap_or(config.merge.missing_content),
            },
        }
    }
}

/// Index selection and upload tuning, shared by `publish` and `facets`.
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Index name
    #[arg(long)]
    pub index: Option<String>,

    /// Wait until Algolia has applied every task
    #[arg(long)]
    pub wait: bool,
}

impl IndexArgs {
    /// Build the client; missing credentials are fatal.
    pub fn client(&self, config: &Config, batch_size: Option<usize>) -> Result<AlgoliaClient> {
        let algolia = &config.algolia;
        let credentials = match (&algolia.app_id, &algolia.api_key) {
            (Some(app_id), Some(api_key)) => Credentials::new(app_id, api_key)?,
            _ => Credentials::from_env()?,
        };
        let client_config = ClientConfig {
            index_name: self.index.clone().unwrap_or_else(|| algolia.index.clone()),
            batch_size: batch_size.unwrap_or(algolia.batch_size),
            max_retries: algolia.max_retries,
            request_timeout: Duration::from_secs(algolia.request_timeout),
            wait_for_tasks: self.wait || algolia.wait,
            base_url: algolia.base_url.clone(),
            ..Default::default()
        };
        AlgoliaClient::new(credentials, client_config).context("Failed to initialize Algolia client")
    }
}

/// Required facet attributes from config, as borrowed strs.
pub fn facet_list(config: &Config) -> Vec<&str> {
    config.algolia.facets.iter().map(String::as_str).collect()
}

pub fn print_merge_summary(summary: &MergeSummary) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
    use tableline_core::fmt_num;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Merge").fg(Color::Cyan),
            Cell::new("Count").fg(Color::Cyan),
        ]);
    table.add_row(vec!["Structural records", &fmt_num(summary.structural)]);
    table.add_row(vec!["Content rows", &fmt_num(summary.content)]);
    table.add_row(vec!["Merged", &fmt_num(summary.merged)]);
    table.add_row(vec!["Duplicate ids", &fmt_num(summary.duplicate_ids)]);
    table.add_row(vec!["Without content", &fmt_num(summary.incomplete)]);
    table.add_row(vec!["Dropped", &fmt_num(summary.dropped)]);
    eprintln!("\n{table}");
}
