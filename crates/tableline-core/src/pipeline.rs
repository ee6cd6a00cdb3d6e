//! End-to-end run: read both datasets, decode, merge, publish.
//!
//! Each step completes before the next one starts; nothing is published
//! unless every record decoded and merged cleanly.

use std::path::{Path, PathBuf};

use crate::content::{HeaderMode, decode_content};
use crate::error::{PipelineError, Result};
use crate::merge::{MergeOptions, MergeSummary, merge};
use crate::publish::{FacetUpdate, SearchIndex, ensure_facets};
use crate::record::{Restaurant, to_rows};
use crate::structural::decode_structural;

/// Inputs of one merge run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Structural dataset (JSON array)
    pub structural_path: PathBuf,
    /// Content dataset (`;`-delimited CSV)
    pub content_path: PathBuf,
    pub header: HeaderMode,
    pub merge: MergeOptions,
}

/// Result of [`publish`].
#[derive(Debug, Clone)]
pub struct PublishSummary {
    pub records: usize,
    pub task_ids: Vec<i64>,
    pub facets: FacetUpdate,
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| PipelineError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

/// Load both datasets and merge them into the final record set.
pub fn load_and_merge(config: &PipelineConfig) -> Result<(Vec<Restaurant>, MergeSummary)> {
    log::info!("Reading structural dataset {}", config.structural_path.display());
    let bytes = read_file(&config.structural_path)?;
    let structural = decode_structural(bytes.as_slice())?;
    log::info!("{} restaurants in structural dataset", structural.len());

    log::info!("Reading content dataset {}", config.content_path.display());
    let bytes = read_file(&config.content_path)?;
    let content = decode_content(bytes.as_slice(), config.header)?;
    log::info!("{} rows in content dataset", content.len());

    merge(structural, content, config.merge)
}

/// Save every record to the index, then reconcile facet settings.
pub fn publish(
    records: &[Restaurant],
    index: &dyn SearchIndex,
    required_facets: &[&str],
) -> Result<PublishSummary> {
    let rows = to_rows(records);
    let task_ids = index.save_objects(&rows)?;
    log::info!(
        "done uploading {} records ({} batches)",
        rows.len(),
        task_ids.len()
    );

    let facets = ensure_facets(index, required_facets)?;
    Ok(PublishSummary {
        records: rows.len(),
        task_ids,
        facets,
    })
}
