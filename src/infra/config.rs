//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use crate::io::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::services::summary::SummaryLanguage;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LayoutConfig {
    /// JSON layout file; the built-in hall is used when unset
    #[serde(default)]
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_summary_model")]
    pub model: String,
    #[serde(default = "default_summary_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_summary_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub language: SummaryLanguage,
}

fn default_summary_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_summary_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_summary_timeout_ms() -> u64 {
    30_000
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: default_summary_model(),
            base_url: default_summary_base_url(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_summary_timeout_ms(),
            language: SummaryLanguage::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_output_dir")]
    pub output_dir: String,
    /// TrueType font for CJK text in reports
    #[serde(default)]
    pub font_path: Option<String>,
}

fn default_report_output_dir() -> String {
    ".".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { output_dir: default_report_output_dir(), font_path: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log file for the interactive editor (the terminal is owned by the UI)
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_file() -> String {
    "booth-planner.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { file: default_log_file() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    layout_seed_file: Option<String>,
    summary_model: String,
    summary_base_url: String,
    summary_api_key_env: String,
    summary_timeout_ms: u64,
    summary_language: SummaryLanguage,
    report_output_dir: String,
    report_font_path: Option<String>,
    log_file: String,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        Self {
            layout_seed_file: toml_config.layout.seed_file.filter(|s| !s.trim().is_empty()),
            summary_model: toml_config.summary.model,
            summary_base_url: toml_config.summary.base_url,
            summary_api_key_env: toml_config.summary.api_key_env,
            summary_timeout_ms: toml_config.summary.timeout_ms,
            summary_language: toml_config.summary.language,
            report_output_dir: toml_config.report.output_dir,
            report_font_path: toml_config.report.font_path.filter(|s| !s.trim().is_empty()),
            log_file: toml_config.logging.file,
            config_file: config_file.to_string(),
        }
    }

    /// Determine config file path from the command line or environment
    pub fn resolve_config_path(cli_path: Option<&str>) -> String {
        if let Some(path) = cli_path {
            return path.to_string();
        }

        // Check CONFIG_FILE environment variable
        if let Ok(path) = env::var("CONFIG_FILE") {
            return path;
        }

        "config/dev.toml".to_string()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration, falling back to defaults if the file is missing or invalid
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path, error = %e, "config_load_failed_using_defaults");
                Self::default()
            }
        }
    }

    pub fn layout_seed_file(&self) -> Option<&str> {
        self.layout_seed_file.as_deref()
    }

    pub fn summary_model(&self) -> &str {
        &self.summary_model
    }

    pub fn summary_base_url(&self) -> &str {
        &self.summary_base_url
    }

    pub fn summary_api_key_env(&self) -> &str {
        &self.summary_api_key_env
    }

    pub fn summary_timeout_ms(&self) -> u64 {
        self.summary_timeout_ms
    }

    pub fn summary_language(&self) -> SummaryLanguage {
        self.summary_language
    }

    pub fn report_output_dir(&self) -> &str {
        &self.report_output_dir
    }

    pub fn report_font_path(&self) -> Option<&str> {
        self.report_font_path.as_deref()
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method to override the report directory (CLI flag)
    pub fn with_report_output_dir(mut self, dir: &str) -> Self {
        self.report_output_dir = dir.to_string();
        self
    }

    /// Builder method for tests to point the summary client at a mock server
    #[cfg(test)]
    pub fn with_summary_base_url(mut self, url: &str) -> Self {
        self.summary_base_url = url.to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.layout_seed_file(), None);
        assert_eq!(config.summary_model(), "gemini-3-flash-preview");
        assert_eq!(config.summary_base_url(), "https://generativelanguage.googleapis.com/v1beta");
        assert_eq!(config.summary_api_key_env(), "GEMINI_API_KEY");
        assert_eq!(config.summary_timeout_ms(), 30_000);
        assert_eq!(config.summary_language(), SummaryLanguage::Ja);
        assert_eq!(config.report_output_dir(), ".");
        assert_eq!(config.log_file(), "booth-planner.log");
        assert_eq!(config.config_file(), "default");
    }

    #[test]
    fn test_resolve_config_path_prefers_cli() {
        assert_eq!(Config::resolve_config_path(Some("config/autumn.toml")), "config/autumn.toml");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[summary]
language = "en"
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "inline");
        assert_eq!(config.summary_language(), SummaryLanguage::En);
        assert_eq!(config.summary_model(), "gemini-3-flash-preview");
        assert_eq!(config.report_output_dir(), ".");
    }

    #[test]
    fn test_blank_paths_are_unset() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[layout]
seed_file = ""

[report]
font_path = "  "
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "inline");
        assert_eq!(config.layout_seed_file(), None);
        assert_eq!(config.report_font_path(), None);
    }
}
