//! Blocking Algolia client over a shared async runtime.
//!
//! Uses async reqwest internally but presents a sync interface, so the
//! pipeline stays a straight sequence of steps.

use std::sync::LazyLock;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tableline_core::{PipelineError, SearchIndex};

use crate::api::{
    BatchRequest, BatchResponse, FacetSettings, IndexSettings, TaskStatus, UpdatedAtResponse,
};
use crate::error::AlgoliaError;
use crate::hosts::{CallKind, Hosts};

/// Records per `/batch` call
pub const DEFAULT_BATCH_SIZE: usize = 1000;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const TASK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Shared tokio runtime for HTTP operations.
static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Exponential backoff: `unit` × 2^attempt (2s, 4s, 8s, ... for a 1s unit)
pub fn backoff_duration(unit: Duration, attempt: u32) -> Duration {
    unit.saturating_mul(2u32.saturating_pow(attempt))
}

/// Application id and admin API key.
#[derive(Clone)]
pub struct Credentials {
    pub app_id: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("api_key", &"***")
            .finish()
    }
}

impl Credentials {
    pub const APP_ID_VAR: &'static str = "ALGOLIA_APP_ID";
    pub const API_KEY_VAR: &'static str = "ALGOLIA_API_KEY";

    pub fn new(
        app_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, AlgoliaError> {
        let creds = Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
        };
        if creds.app_id.is_empty() {
            return Err(AlgoliaError::Credentials(format!(
                "{} is empty",
                Self::APP_ID_VAR
            )));
        }
        if creds.api_key.is_empty() {
            return Err(AlgoliaError::Credentials(format!(
                "{} is empty",
                Self::API_KEY_VAR
            )));
        }
        Ok(creds)
    }

    /// Read `ALGOLIA_APP_ID` and `ALGOLIA_API_KEY`.
    pub fn from_env() -> Result<Self, AlgoliaError> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| AlgoliaError::Credentials(format!("{name} is not set")))
        };
        Self::new(var(Self::APP_ID_VAR)?, var(Self::API_KEY_VAR)?)
    }
}

/// Client settings other than credentials.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub index_name: String,
    pub batch_size: usize,
    /// Retries per call, spread across the host list
    pub max_retries: u32,
    pub request_timeout: Duration,
    /// Block until every task is published
    pub wait_for_tasks: bool,
    pub task_timeout: Duration,
    /// Base of the exponential retry backoff
    pub backoff_unit: Duration,
    /// Comma-separated hosts used instead of the Algolia topology
    pub base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            index_name: "restaurants".to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: 3,
            request_timeout: Duration::from_secs(30),
            wait_for_tasks: false,
            task_timeout: Duration::from_secs(300),
            backoff_unit: Duration::from_secs(1),
            base_url: None,
        }
    }
}

/// Algolia search index client.
pub struct AlgoliaClient {
    http: reqwest::Client,
    credentials: Credentials,
    hosts: Hosts,
    config: ClientConfig,
    progress: ProgressBar,
}

impl AlgoliaClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self, AlgoliaError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.request_timeout)
            .user_agent(concat!("tableline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AlgoliaError::from_reqwest)?;
        let hosts = match &config.base_url {
            Some(url) => Hosts::fixed(url),
            None => Hosts::for_app(&credentials.app_id),
        };
        if hosts.is_empty() {
            return Err(AlgoliaError::Http {
                status: None,
                message: "base_url names no hosts".to_string(),
            });
        }
        Ok(Self {
            http,
            credentials,
            hosts,
            config,
            progress: ProgressBar::hidden(),
        })
    }

    /// Attach a bar advanced by the number of records in each sent batch.
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = pb;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    fn index_path(&self, suffix: &str) -> String {
        format!(
            "/1/indexes/{}{suffix}",
            urlencoding::encode(&self.config.index_name)
        )
    }

    /// One HTTP exchange against one host.
    fn send_once<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<T, AlgoliaError> {
        let (status, text) = SHARED_RUNTIME.handle().block_on(async {
            let mut req = self
                .http
                .request(method, url)
                .header("x-algolia-application-id", &self.credentials.app_id)
                .header("x-algolia-api-key", &self.credentials.api_key);
            if let Some(body) = body {
                req = req.json(body);
            }
            let resp = req.send().await.map_err(AlgoliaError::from_reqwest)?;
            let status = resp.status();
            let text = resp.text().await.map_err(AlgoliaError::from_reqwest)?;
            Ok::<_, AlgoliaError>((status, text))
        })?;

        if !status.is_success() {
            return Err(AlgoliaError::Http {
                status: Some(status.as_u16()),
                message: error_message(&text),
            });
        }
        serde_json::from_str(&text).map_err(|e| AlgoliaError::InvalidResponse(e.to_string()))
    }

    /// Call with retry, rotating through the hosts for `kind`.
    fn call<T: DeserializeOwned>(
        &self,
        kind: CallKind,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, AlgoliaError> {
        let hosts = self.hosts.for_call(kind);
        let max_retries = self.config.max_retries;
        let mut attempt = 0u32;
        loop {
            let host = &hosts[attempt as usize % hosts.len()];
            match self.send_once(method.clone(), &format!("{host}{path}"), body) {
                Ok(v) => return Ok(v),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    attempt += 1;
                    log::warn!(
                        "{method} {path}: attempt {attempt}/{max_retries} failed: {e}, retrying..."
                    );
                    std::thread::sleep(backoff_duration(self.config.backoff_unit, attempt));
                }
                Err(e) => {
                    log::error!("{method} {path}: failed permanently: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Upsert objects in `batch_size` chunks. Returns one task id per chunk.
    pub fn save_objects(&self, objects: &[Map<String, Value>]) -> Result<Vec<i64>, AlgoliaError> {
        let path = self.index_path("/batch");
        let batch_size = self.config.batch_size.max(1);
        let mut task_ids = Vec::with_capacity(objects.len().div_ceil(batch_size));

        for (n, chunk) in objects.chunks(batch_size).enumerate() {
            let body = to_value(&BatchRequest::add_objects(chunk))?;
            let resp: BatchResponse = self.call(CallKind::Write, Method::POST, &path, Some(&body))?;
            log::debug!(
                "batch {} saved {} objects (task {})",
                n + 1,
                resp.object_ids.len(),
                resp.task_id
            );
            self.progress.inc(chunk.len() as u64);
            task_ids.push(resp.task_id);
        }
        self.progress.finish_and_clear();

        if self.config.wait_for_tasks {
            for &task_id in &task_ids {
                self.wait_task(task_id)?;
            }
        }
        Ok(task_ids)
    }

    pub fn get_settings(&self) -> Result<IndexSettings, AlgoliaError> {
        self.call(
            CallKind::Read,
            Method::GET,
            &self.index_path("/settings"),
            None,
        )
    }

    /// Write `attributesForFaceting`, leaving every other setting untouched.
    pub fn set_facets(&self, attributes: &[String]) -> Result<i64, AlgoliaError> {
        let body = to_value(&FacetSettings {
            attributes_for_faceting: attributes,
        })?;
        let resp: UpdatedAtResponse = self.call(
            CallKind::Write,
            Method::PUT,
            &self.index_path("/settings"),
            Some(&body),
        )?;
        log::debug!(
            "settings task {} (updated at {})",
            resp.task_id,
            resp.updated_at.as_deref().unwrap_or("?")
        );
        if self.config.wait_for_tasks {
            self.wait_task(resp.task_id)?;
        }
        Ok(resp.task_id)
    }

    /// Poll a task until Algolia reports it published.
    pub fn wait_task(&self, task_id: i64) -> Result<(), AlgoliaError> {
        let path = self.index_path(&format!("/task/{task_id}"));
        let deadline = Instant::now() + self.config.task_timeout;
        loop {
            let status: TaskStatus = self.call(CallKind::Read, Method::GET, &path, None)?;
            if status.is_published() {
                log::debug!("task {task_id} published");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AlgoliaError::Http {
                    status: None,
                    message: format!(
                        "task {task_id} not published after {:?}",
                        self.config.task_timeout
                    ),
                });
            }
            std::thread::sleep(TASK_POLL_INTERVAL);
        }
    }
}

impl SearchIndex for AlgoliaClient {
    fn save_objects(&self, objects: &[Map<String, Value>]) -> Result<Vec<i64>, PipelineError> {
        Ok(AlgoliaClient::save_objects(self, objects)?)
    }

    fn facet_attributes(&self) -> Result<Vec<String>, PipelineError> {
        Ok(self.get_settings()?.attributes_for_faceting.unwrap_or_default())
    }

    fn set_facet_attributes(&self, attributes: &[String]) -> Result<i64, PipelineError> {
        Ok(self.set_facets(attributes)?)
    }
}

fn to_value(body: &impl Serialize) -> Result<Value, AlgoliaError> {
    serde_json::to_value(body).map_err(|e| AlgoliaError::InvalidResponse(e.to_string()))
}

/// Pull `message` out of an Algolia error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
