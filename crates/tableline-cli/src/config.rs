//! `tableline.toml`: dataset paths, merge policy and Algolia settings

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tableline_core::{DEFAULT_FACETS, HeaderMode, MissingContent};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub merge: MergeConfig,
    pub algolia: AlgoliaConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub structural: PathBuf,
    pub content: PathBuf,
    pub header: HeaderMode,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            structural: PathBuf::from("dataset/restaurants_list.json"),
            content: PathBuf::from("dataset/restaurants_info.csv"),
            header: HeaderMode::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub missing_content: MissingContent,
    pub reject_duplicate_ids: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            missing_content: MissingContent::Fail,
            reject_duplicate_ids: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlgoliaConfig {
    #[serde(deserialize_with = "deserialize_env_var")]
    pub app_id: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
    pub index: String,
    pub batch_size: usize,
    pub max_retries: u32,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
    pub wait: bool,
    /// Comma-separated hosts replacing the Algolia topology (proxy or mock)
    pub base_url: Option<String>,
    pub facets: Vec<String>,
}

impl Default for AlgoliaConfig {
    fn default() -> Self {
        Self {
            app_id: std::env::var("ALGOLIA_APP_ID").ok(),
            api_key: std::env::var("ALGOLIA_API_KEY").ok(),
            index: "restaurants".to_string(),
            batch_size: tableline_algolia::DEFAULT_BATCH_SIZE,
            max_retries: 3,
            request_timeout: 30,
            wait: false,
            base_url: None,
            facets: DEFAULT_FACETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `app_id` / `api_key` values may be written as `${VAR}` to keep secrets
/// out of the file. An unset variable reads as "not configured".
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| expand_env_var(&raw)))
}

fn expand_env_var(raw: &str) -> Option<String> {
    match raw.strip_prefix("${").and_then(|rest| rest.strip_suffix('}')) {
        Some(name) => std::env::var(name).ok(),
        None => Some(raw.to_owned()),
    }
}

/// Config files checked by [`Config::load`], most specific first.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("tableline.toml")];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "tableline") {
        paths.push(dirs.config_dir().join("config.toml"));
    }
    paths
}

impl Config {
    /// First existing file of `./tableline.toml` and
    /// `~/.config/tableline/config.toml`, or the defaults.
    pub fn load() -> Result<Self> {
        match candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::from_file(&path),
            None => {
                log::debug!("no tableline config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let config = toml::from_str::<Config>(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::info!("Using config {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(
            config.input.structural,
            PathBuf::from("dataset/restaurants_list.json")
        );
        assert_eq!(config.input.header, HeaderMode::Auto);
        assert_eq!(config.merge.missing_content, MissingContent::Fail);
        assert!(config.merge.reject_duplicate_ids);
        assert_eq!(config.algolia.index, "restaurants");
        assert_eq!(config.algolia.batch_size, 1000);
        assert_eq!(config.algolia.facets, vec!["food_type", "payment_options"]);
    }

    #[test]
    fn env_reference_expansion() {
        assert_eq!(expand_env_var("APP1").as_deref(), Some("APP1"));
        assert_eq!(expand_env_var("${TABLELINE_TEST_UNSET_VAR}"), None);
        assert_eq!(expand_env_var("${PATH}"), std::env::var("PATH").ok());
    }

    #[test]
    fn local_file_searched_first() {
        assert_eq!(candidate_paths()[0], PathBuf::from("tableline.toml"));
    }

    #[test]
    fn full_config_file() {
        let toml = r#"
[input]
structural = "/data/list.json"
content = "/data/info.csv"
header = "present"

[merge]
missing_content = "drop"
reject_duplicate_ids = false

[algolia]
app_id = "APP1"
index = "restaurants_dev"
batch_size = 250
wait = true
facets = ["food_type", "payment_options", "dining_style"]
"#;
        let config = toml::from_str::<Config>(toml).unwrap();
        assert_eq!(config.input.structural, PathBuf::from("/data/list.json"));
        assert_eq!(config.input.header, HeaderMode::Present);
        assert_eq!(config.merge.missing_content, MissingContent::Drop);
        assert!(!config.merge.reject_duplicate_ids);
        assert_eq!(config.algolia.app_id.as_deref(), Some("APP1"));
        assert_eq!(config.algolia.index, "restaurants_dev");
        assert_eq!(config.algolia.batch_size, 250);
        assert!(config.algolia.wait);
        assert_eq!(config.algolia.facets.len(), 3);
        assert_eq!(config.algolia.max_retries, 3);
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let toml = "[merge]\nmissing_content = \"ignore\"\n";
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tableline.toml");
        std::fs::write(&path, "[input\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err}").contains("tableline.toml"));
    }
}
