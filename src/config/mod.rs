pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "auto-analyst")]
#[command(about = "Automated exploratory analysis for CSV datasets with an optional AI report")]
pub struct CliConfig {
    /// Path to the input CSV dataset
    #[arg(long, short = 'i')]
    pub input: String,

    /// Directory where analysis artifacts are written
    #[arg(long, default_value = "./analysis")]
    pub output_path: String,

    /// Gemini model for the AI report. Known models: gemini-2.5-flash,
    /// gemini-2.0-flash-exp, gemini-1.5-flash, gemini-1.5-pro
    #[arg(long, default_value = "gemini-2.5-flash")]
    pub model: String,

    /// Gemini API key; falls back to GEMINI_API_KEY from the environment or .env
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL of the generative AI endpoint
    #[arg(long, default_value = "https://generativelanguage.googleapis.com")]
    pub api_base_url: String,

    /// Minimum number of rows the dataset must have
    #[arg(long, default_value = "2000")]
    pub min_rows: usize,

    /// Minimum number of columns the dataset must have
    #[arg(long, default_value = "10")]
    pub min_columns: usize,

    /// Skip AI report generation even when an API key is configured
    #[arg(long)]
    pub no_report: bool,

    /// Also write a zip bundle of the analysis artifacts
    #[arg(long)]
    pub bundle: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Log system resource usage per phase
    #[arg(long)]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Fills the API key from `GEMINI_API_KEY` when no flag was given.
    /// An absent key disables report generation rather than failing the run.
    pub fn resolve_api_key(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        if let Some(key) = &self.api_key {
            if key.trim().is_empty() {
                self.api_key = None;
            }
        }
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn min_rows(&self) -> usize {
        self.min_rows
    }

    fn min_columns(&self) -> usize {
        self.min_columns
    }

    fn report_enabled(&self) -> bool {
        !self.no_report
    }

    fn bundle_enabled(&self) -> bool {
        self.bundle
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_positive_number("min_rows", self.min_rows, 1)?;
        validation::validate_positive_number("min_columns", self.min_columns, 1)?;
        validation::validate_non_empty_string("model", &self.model)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn base_config() -> CliConfig {
        CliConfig {
            input: "data.csv".to_string(),
            output_path: "./analysis".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            min_rows: 2000,
            min_columns: 10,
            no_report: false,
            bundle: false,
            verbose: false,
            monitor: false,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_non_csv_input_rejected() {
        let mut config = base_config();
        config.input = "data.parquet".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_thresholds_rejected() {
        let mut config = base_config();
        config.min_rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_resolves_to_none() {
        let mut config = base_config();
        config.api_key = Some("   ".to_string());
        config.resolve_api_key();
        assert!(config.api_key.is_none());
        assert!(ConfigProvider::api_key(&config).is_none());
    }

    #[test]
    fn test_flag_key_takes_precedence() {
        let mut config = base_config();
        config.api_key = Some("flag-key".to_string());
        config.resolve_api_key();
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
    }
}
