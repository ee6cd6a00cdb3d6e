//! Join content rows onto structural records by identifier

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::record::{ContentRow, Restaurant};

/// What to do with structural records that never receive a content row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingContent {
    /// Fail the run naming the first incomplete record.
    #[default]
    Fail,
    /// Remove incomplete records from the output.
    Drop,
    /// Publish incomplete records with empty content fields.
    Keep,
}

impl std::str::FromStr for MissingContent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "drop" => Ok(Self::Drop),
            "keep" => Ok(Self::Keep),
            other => Err(format!(
                "invalid missing-content policy {other:?} (expected fail, drop or keep)"
            )),
        }
    }
}

impl std::fmt::Display for MissingContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Drop => write!(f, "drop"),
            Self::Keep => write!(f, "keep"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    /// Treat a repeated structural identifier as a schema violation. When
    /// cleared, the later record wins the lookup.
    pub reject_duplicate_ids: bool,
    pub missing_content: MissingContent,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            reject_duplicate_ids: true,
            missing_content: MissingContent::default(),
        }
    }
}

/// Counts from one merge, for logging and the CLI summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub structural: usize,
    pub content: usize,
    pub merged: usize,
    pub duplicate_ids: usize,
    pub incomplete: usize,
    pub dropped: usize,
}

/// Attach every content row to the structural record with the same id.
///
/// Output keeps the structural order. A content row with no structural
/// counterpart is [`PipelineError::UnmatchedIdentifier`]. Structural records
/// left without content are not checked here; see [`enforce_completeness`].
///
/// With duplicate structural ids the last occurrence owns the id: it is the
/// one that receives content, earlier copies stay incomplete.
pub fn join(
    records: &mut [Restaurant],
    content: Vec<ContentRow>,
    reject_duplicate_ids: bool,
) -> Result<(usize, usize)> {
    let mut by_id: FxHashMap<i64, usize> =
        FxHashMap::with_capacity_and_hasher(records.len(), Default::default());
    let mut duplicates = 0;

    for (pos, record) in records.iter().enumerate() {
        if by_id.insert(record.id, pos).is_some() {
            if reject_duplicate_ids {
                return Err(PipelineError::SchemaViolation(format!(
                    "duplicate objectID {}",
                    record.id
                )));
            }
            log::warn!("duplicate objectID {}: later record wins", record.id);
            duplicates += 1;
        }
    }

    let mut merged = 0;
    for row in content {
        let pos = *by_id
            .get(&row.id)
            .ok_or(PipelineError::UnmatchedIdentifier(row.id))?;
        let record = &mut records[pos];
        if record.content.is_some() {
            log::warn!("objectID {}: content row repeated, later row wins", row.id);
        } else {
            merged += 1;
        }
        record.content = Some(row.content);
    }

    Ok((merged, duplicates))
}

/// Apply the [`MissingContent`] policy to a joined record set.
///
/// Returns the number of incomplete records found.
pub fn enforce_completeness(
    records: &mut Vec<Restaurant>,
    policy: MissingContent,
) -> Result<usize> {
    let incomplete = records.iter().filter(|r| !r.is_complete()).count();
    if incomplete == 0 {
        return Ok(0);
    }

    match policy {
        MissingContent::Fail => {
            let first = records.iter().find(|r| !r.is_complete()).map_or(0, |r| r.id);
            Err(PipelineError::IncompleteRecord(first))
        }
        MissingContent::Drop => {
            log::warn!("dropping {incomplete} restaurants without content");
            records.retain(Restaurant::is_complete);
            Ok(incomplete)
        }
        MissingContent::Keep => {
            log::warn!("{incomplete} restaurants have no content row");
            Ok(incomplete)
        }
    }
}

/// Join and reconcile the two datasets into the final record set.
pub fn merge(
    mut records: Vec<Restaurant>,
    content: Vec<ContentRow>,
    options: MergeOptions,
) -> Result<(Vec<Restaurant>, MergeSummary)> {
    let structural = records.len();
    let content_count = content.len();

    let (merged, duplicate_ids) = join(&mut records, content, options.reject_duplicate_ids)?;
    let incomplete = enforce_completeness(&mut records, options.missing_content)?;
    let dropped = structural - records.len();

    let summary = MergeSummary {
        structural,
        content: content_count,
        merged,
        duplicate_ids,
        incomplete,
        dropped,
    };
    log::info!(
        "merged {merged}/{structural} restaurants from {content_count} content rows \
         ({incomplete} incomplete, {dropped} dropped, {duplicate_ids} duplicate ids)"
    );
    Ok((records, summary))
}
