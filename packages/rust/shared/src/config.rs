//! Application configuration for Navi.
//!
//! User config lives at `~/.navi/navi.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NaviError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "navi.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".navi";

/// File the desktop app writes when the user saves an API key in Settings.
pub const CREDENTIAL_FILE_NAME: &str = "regulations_api_config.json";

/// Upper bound on concurrent comment detail requests.
pub const MAX_DETAIL_CONCURRENCY: usize = 6;

// ---------------------------------------------------------------------------
// Config structs (matching navi.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// regulations.gov provider settings.
    #[serde(default)]
    pub regulations: RegulationsConfig,

    /// Aggregation pipeline tuning.
    #[serde(default)]
    pub pipeline: PipelineSection,
}

/// `[regulations]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationsConfig {
    /// API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Explicit path to the `{ "apiKey": ... }` credential file.
    /// Defaults to `regulations_api_config.json` in the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_file: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for RegulationsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            api_key_file: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.regulations.gov/v4".into()
}
fn default_api_key_env() -> String {
    "NAVI_REGULATIONS_API_KEY".into()
}
fn default_request_timeout() -> u64 {
    30
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Comment detail requests kept in flight at once (1 = sequential).
    #[serde(default = "default_detail_concurrency")]
    pub detail_concurrency: usize,

    /// Overall deadline for one aggregation, in seconds. Unset = no deadline
    /// beyond the per-request timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            detail_concurrency: default_detail_concurrency(),
            deadline_secs: None,
        }
    }
}

fn default_detail_concurrency() -> usize {
    4
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime client configuration, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl From<&AppConfig> for ClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.regulations.base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(config.regulations.request_timeout_secs),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Concurrent detail requests, always within `1..=MAX_DETAIL_CONCURRENCY`.
    pub detail_concurrency: usize,
    /// Overall deadline for one aggregation.
    pub deadline: Option<Duration>,
}

impl PipelineConfig {
    /// Override the detail concurrency, clamped into the supported range.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = clamp_concurrency(concurrency);
        self
    }

    /// Override the overall deadline.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            detail_concurrency: clamp_concurrency(config.pipeline.detail_concurrency),
            deadline: config.pipeline.deadline_secs.map(Duration::from_secs),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

fn clamp_concurrency(n: usize) -> usize {
    n.clamp(1, MAX_DETAIL_CONCURRENCY)
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.navi/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| NaviError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.navi/navi.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolve where the JSON credential file is expected.
pub fn credential_file_path(config: &AppConfig) -> Result<PathBuf> {
    match &config.regulations.api_key_file {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(config_dir()?.join(CREDENTIAL_FILE_NAME)),
    }
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NaviError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| NaviError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NaviError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| NaviError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NaviError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("NAVI_REGULATIONS_API_KEY"));
        assert!(!toml_str.contains("api_key_file"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[regulations]
base_url = "http://localhost:9000/v4/"

[pipeline]
detail_concurrency = 2
deadline_secs = 45
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.regulations.api_key_env, "NAVI_REGULATIONS_API_KEY");
        assert_eq!(config.regulations.request_timeout_secs, 30);

        let client = ClientConfig::from(&config);
        assert_eq!(client.base_url, "http://localhost:9000/v4");

        let pipeline = PipelineConfig::from(&config);
        assert_eq!(pipeline.detail_concurrency, 2);
        assert_eq!(pipeline.deadline, Some(Duration::from_secs(45)));
    }

    #[test]
    fn pipeline_concurrency_is_clamped() {
        let mut app = AppConfig::default();
        app.pipeline.detail_concurrency = 0;
        assert_eq!(PipelineConfig::from(&app).detail_concurrency, 1);

        app.pipeline.detail_concurrency = 64;
        assert_eq!(PipelineConfig::from(&app).detail_concurrency, 6);

        let overridden = PipelineConfig::default().with_concurrency(3);
        assert_eq!(overridden.detail_concurrency, 3);
    }

    #[test]
    fn credential_file_override() {
        let mut app = AppConfig::default();
        app.regulations.api_key_file = Some("/etc/navi/key.json".into());
        assert_eq!(
            credential_file_path(&app).unwrap(),
            PathBuf::from("/etc/navi/key.json")
        );
    }

    #[test]
    fn load_config_from_reports_parse_errors() {
        let dir = std::env::temp_dir().join(format!("navi-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[regulations\nbase_url = 1").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, NaviError::Configuration { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
