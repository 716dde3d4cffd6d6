#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PRODUCTION_BASE_URL: &str = "https://api.bulkingest.io";
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000";

/// Source types this tool knows how to read.
pub const SUPPORTED_SOURCE_TYPES: &[&str] = &["jsonl"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub environment: EnvironmentConfig,
    pub api: ApiConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    Development,
    #[default]
    Production,
}

impl DeploymentMode {
    pub fn base_url(self) -> &'static str {
        match self {
            DeploymentMode::Development => DEVELOPMENT_BASE_URL,
            DeploymentMode::Production => PRODUCTION_BASE_URL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub mode: DeploymentMode,
    /// Replaces the mode's fixed host, e.g. for staging.
    pub endpoint: Option<String>,
    /// PEM file used as the only trust anchor for https.
    pub ca_bundle: Option<PathBuf>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_type")]
    pub r#type: String,
    pub path: Option<PathBuf>,
    pub page_size: Option<usize>,
}

fn default_source_type() -> String {
    "jsonl".to_string()
}

impl ExportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| ExportError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${EXPORT_API_KEY})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ExportError::config(format!("invalid placeholder pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Base URL of the bulk API, chosen once from the deployment mode.
    pub fn base_url(&self) -> &str {
        self.api
            .endpoint
            .as_deref()
            .unwrap_or_else(|| self.api.mode.base_url())
    }

    pub fn page_size(&self) -> usize {
        self.source
            .page_size
            .unwrap_or(crate::core::batcher::DEFAULT_PAGE_SIZE)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(30)
    }

    pub fn is_production_environment(&self) -> bool {
        self.environment.name.trim().eq_ignore_ascii_case("production")
    }
}

/// Largest page the source may be asked for in one request.
const MAX_PAGE_SIZE: u64 = 10_000;
/// Upper bound on the per-request timeout.
const MAX_TIMEOUT_SECONDS: u64 = 600;

impl Validate for ExportConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.api.endpoint {
            validation::validate_base_url("api.endpoint", endpoint)?;
        }

        if let Some(ca_bundle) = &self.api.ca_bundle {
            validation::validate_trust_anchor("api.ca_bundle", ca_bundle)?;
        }

        // source.path 是否存在由前置條件檢查
        validation::validate_in_range("source.page_size", self.page_size() as u64, 1, MAX_PAGE_SIZE)?;
        validation::validate_in_range(
            "api.timeout_seconds",
            self.timeout_seconds(),
            1,
            MAX_TIMEOUT_SECONDS,
        )?;

        Ok(())
    }
}
