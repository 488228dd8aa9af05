//! Where the regulations.gov API key comes from.
//!
//! The pipeline never looks a key up on its own; a [`CredentialSource`] is
//! handed to it at construction. The key is read fresh for every invocation
//! and never written anywhere.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{AppConfig, credential_file_path};
use crate::error::{NaviError, Result};
use crate::types::ApiKey;

/// Supplies the API key for a pipeline invocation.
pub trait CredentialSource: Send + Sync {
    /// Current key, or `None` when nothing is configured.
    fn api_key(&self) -> Option<ApiKey>;

    /// Short label for logs and diagnostics.
    fn describe(&self) -> String;
}

/// Fetch the key or fail with a configuration error.
pub fn require_api_key(source: &dyn CredentialSource) -> Result<ApiKey> {
    source.api_key().ok_or_else(|| {
        NaviError::config(format!(
            "no regulations.gov API key configured (checked {}). \
             Get a key at https://open.gsa.gov/api/regulationsgov/",
            source.describe()
        ))
    })
}

// ---------------------------------------------------------------------------
// StaticCredential
// ---------------------------------------------------------------------------

/// A fixed key, for hosts that manage the key themselves and for tests.
#[derive(Debug, Clone)]
pub struct StaticCredential(Option<ApiKey>);

impl StaticCredential {
    pub fn new(key: ApiKey) -> Self {
        Self(Some(key))
    }

    /// A source that never yields a key.
    pub fn missing() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredential {
    fn api_key(&self) -> Option<ApiKey> {
        self.0.clone()
    }

    fn describe(&self) -> String {
        "static key".into()
    }
}

// ---------------------------------------------------------------------------
// EnvCredential
// ---------------------------------------------------------------------------

/// Reads the key from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredential {
    fn api_key(&self) -> Option<ApiKey> {
        std::env::var(&self.var).ok().and_then(ApiKey::new)
    }

    fn describe(&self) -> String {
        format!("${}", self.var)
    }
}

// ---------------------------------------------------------------------------
// FileCredential
// ---------------------------------------------------------------------------

/// Shape of the JSON file the desktop app writes when a key is saved.
#[derive(Deserialize)]
struct CredentialFile {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

/// Reads `{ "apiKey": "..." }` from a JSON file on every call.
#[derive(Debug, Clone)]
pub struct FileCredential {
    path: PathBuf,
}

impl FileCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialSource for FileCredential {
    fn api_key(&self) -> Option<ApiKey> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = ?self.path, error = %e, "credential file not readable");
                return None;
            }
        };

        match serde_json::from_str::<CredentialFile>(&content) {
            Ok(file) => file.api_key.and_then(ApiKey::new),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "could not parse credential file");
                None
            }
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// ChainCredential
// ---------------------------------------------------------------------------

/// Tries each source in order; the first key found wins.
pub struct ChainCredential {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl ChainCredential {
    pub fn new(sources: Vec<Box<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// Default lookup order: the saved credential file, then the env var.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let file = FileCredential::new(credential_file_path(config)?);
        let env = EnvCredential::new(config.regulations.api_key_env.clone());
        Ok(Self::new(vec![Box::new(file), Box::new(env)]))
    }
}

impl CredentialSource for ChainCredential {
    fn api_key(&self) -> Option<ApiKey> {
        self.sources.iter().find_map(|source| {
            let key = source.api_key();
            if key.is_some() {
                debug!(source = %source.describe(), "using API key");
            }
            key
        })
    }

    fn describe(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
