//! Algolia REST request and response bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One operation of a `/batch` call.
#[derive(Debug, Serialize)]
pub struct BatchOperation<'a> {
    pub action: &'static str,
    pub body: &'a Map<String, Value>,
}

/// Body of `POST /1/indexes/{index}/batch`.
#[derive(Debug, Serialize)]
pub struct BatchRequest<'a> {
    pub requests: Vec<BatchOperation<'a>>,
}

impl<'a> BatchRequest<'a> {
    /// `addObject` for every object: upsert keyed by `objectID`.
    pub fn add_objects(objects: &'a [Map<String, Value>]) -> Self {
        Self {
            requests: objects
                .iter()
                .map(|body| BatchOperation {
                    action: "addObject",
                    body,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    #[serde(rename = "taskID")]
    pub task_id: i64,
    #[serde(default, rename = "objectIDs")]
    pub object_ids: Vec<String>,
}

/// The subset of index settings this pipeline reads. Unknown settings are
/// ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    #[serde(default)]
    pub attributes_for_faceting: Option<Vec<String>>,
}

/// Body of `PUT /1/indexes/{index}/settings`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetSettings<'a> {
    pub attributes_for_faceting: &'a [String],
}

#[derive(Debug, Deserialize)]
pub struct UpdatedAtResponse {
    #[serde(rename = "taskID")]
    pub task_id: i64,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// `GET /1/indexes/{index}/task/{taskID}`
#[derive(Debug, Deserialize)]
pub struct TaskStatus {
    pub status: String,
}

impl TaskStatus {
    pub fn is_published(&self) -> bool {
        self.status == "published"
    }
}
