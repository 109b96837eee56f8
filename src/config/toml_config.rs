use crate::domain::ports::ConfigProvider;
use crate::report::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::utils::error::{AnalystError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub profile: ProfileInfo,
    pub dataset: DatasetConfig,
    pub report: Option<ReportConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: String,
    pub min_rows: Option<usize>,
    pub min_columns: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub enabled: Option<bool>,
    pub model: Option<String>,
    /// Supports `${GEMINI_API_KEY}` substitution
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub bundle: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl ProfileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalystError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalystError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unresolved
    /// variables are left verbatim.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("dataset.path", &self.dataset.path)?;
        validation::validate_file_extension("dataset.path", &self.dataset.path, &["csv"])?;
        validation::validate_path("output.path", &self.output.path)?;

        if let Some(min_rows) = self.dataset.min_rows {
            validation::validate_positive_number("dataset.min_rows", min_rows, 1)?;
        }
        if let Some(min_columns) = self.dataset.min_columns {
            validation::validate_positive_number("dataset.min_columns", min_columns, 1)?;
        }

        if let Some(report) = &self.report {
            if let Some(model) = &report.model {
                validation::validate_non_empty_string("report.model", model)?;
            }
            if let Some(base_url) = &report.base_url {
                validation::validate_url("report.base_url", base_url)?;
            }
        }

        Ok(())
    }

    /// Fills the API key from `GEMINI_API_KEY` when the profile left it
    /// unset. Absence keeps report generation disabled, never fails.
    pub fn resolve_api_key(&mut self) {
        let report = self.report.get_or_insert_with(|| ReportConfig {
            enabled: None,
            model: None,
            api_key: None,
            base_url: None,
        });
        if configured_key(report.api_key.as_deref()).is_none() {
            report.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

/// A key that is empty or still holds an unresolved `${...}` placeholder
/// counts as not configured.
fn configured_key(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty() && !k.starts_with("${"))
}

impl ConfigProvider for ProfileConfig {
    fn input_path(&self) -> &str {
        &self.dataset.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn model(&self) -> &str {
        self.report
            .as_ref()
            .and_then(|r| r.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }

    fn api_key(&self) -> Option<&str> {
        configured_key(self.report.as_ref().and_then(|r| r.api_key.as_deref()))
    }

    fn api_base_url(&self) -> &str {
        self.report
            .as_ref()
            .and_then(|r| r.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    fn min_rows(&self) -> usize {
        self.dataset.min_rows.unwrap_or(2000)
    }

    fn min_columns(&self) -> usize {
        self.dataset.min_columns.unwrap_or(10)
    }

    fn report_enabled(&self) -> bool {
        self.report
            .as_ref()
            .and_then(|r| r.enabled)
            .unwrap_or(true)
    }

    fn bundle_enabled(&self) -> bool {
        self.output.bundle.unwrap_or(false)
    }
}

impl Validate for ProfileConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
