//! Shared types, error model, configuration, and credentials for Navi.
//!
//! This crate is the foundation depended on by all other Navi crates.
//! It provides:
//! - [`NaviError`]: the closed error taxonomy
//! - Domain types ([`Comment`], [`CommentSummary`], [`CommentPage`], [`ApiKey`])
//! - Configuration ([`AppConfig`], [`ClientConfig`], [`PipelineConfig`], config loading)
//! - Credential sources ([`CredentialSource`] and its implementations)

pub mod config;
pub mod credential;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClientConfig, MAX_DETAIL_CONCURRENCY, PipelineConfig, PipelineSection,
    RegulationsConfig, config_dir, config_file_path, credential_file_path, init_config,
    load_config, load_config_from,
};
pub use credential::{
    ChainCredential, CredentialSource, EnvCredential, FileCredential, StaticCredential,
    require_api_key,
};
pub use error::{NaviError, Result};
pub use types::{ApiKey, Comment, CommentPage, CommentSummary, SAFETY_CAP};
