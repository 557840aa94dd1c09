//! Run configuration.
//!
//! Values come from the command line or the process environment
//! (`CLICKUP_API_KEY`, `GEMINI_API_KEY`, `CLICKUP_WORKSPACE`, ...); see
//! `src/main.rs` for the flag and variable names.

use std::path::PathBuf;

use crate::clickup::client::DEFAULT_URL as CLICKUP_URL;
use crate::report::gemini::{DEFAULT_MODEL, DEFAULT_URL as GEMINI_URL};

/// File name of the aggregated document.
pub const DOCUMENT_FILE: &str = "task.json";
/// File name of the generated report.
pub const REPORT_FILE: &str = "report.md";

/// Connection settings for the ClickUp API.
#[derive(Clone, Debug)]
pub struct ClickUpConfig {
    /// Personal API token, sent verbatim in the `Authorization` header.
    pub api_key: String,
    pub base_url: String,
}

impl ClickUpConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: CLICKUP_URL.to_string(),
        }
    }
}

/// Settings for the text-generation service.
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// Only required when a report is requested.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: GEMINI_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
        }
    }
}

/// Everything one run needs.
#[derive(Clone, Debug)]
pub struct Config {
    pub clickup: ClickUpConfig,
    pub gemini: GeminiConfig,
    /// Workspace to select when the token can see more than one.
    pub workspace_name: Option<String>,
    /// Directory the document and report are written to.
    pub output_dir: PathBuf,
    /// Upper bound on tasks enriched at once. `1` keeps every request sequential.
    pub concurrency: usize,
}

impl Config {
    pub fn new(clickup: ClickUpConfig) -> Self {
        Self {
            clickup,
            gemini: GeminiConfig::default(),
            workspace_name: None,
            output_dir: PathBuf::from("."),
            concurrency: 1,
        }
    }
}
