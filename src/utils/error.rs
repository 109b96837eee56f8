use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalystError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Dataset validation failed: {reason}")]
    DatasetValidationError { reason: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Report generation failed: {message}")]
    ReportError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Data,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Degraded result, run still counts as success
    Low,
    /// Transient, retrying may help
    Medium,
    /// Processing failed
    High,
    /// Environment or system failure
    Critical,
}

impl AnalystError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalystError::ApiError(_) | AnalystError::ReportError { .. } => ErrorCategory::Network,
            AnalystError::CsvError(_)
            | AnalystError::DatasetValidationError { .. }
            | AnalystError::ProcessingError { .. }
            | AnalystError::SerializationError(_) => ErrorCategory::Data,
            AnalystError::MissingConfigError { .. }
            | AnalystError::InvalidConfigValueError { .. }
            | AnalystError::ConfigValidationError { .. } => ErrorCategory::Config,
            AnalystError::IoError(_) | AnalystError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AnalystError::ReportError { .. } => ErrorSeverity::Low,
            AnalystError::ApiError(_) => ErrorSeverity::Medium,
            AnalystError::CsvError(_)
            | AnalystError::SerializationError(_)
            | AnalystError::DatasetValidationError { .. }
            | AnalystError::ProcessingError { .. }
            | AnalystError::MissingConfigError { .. }
            | AnalystError::InvalidConfigValueError { .. }
            | AnalystError::ConfigValidationError { .. } => ErrorSeverity::High,
            AnalystError::IoError(_) | AnalystError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AnalystError::ApiError(_) => {
                "Check network connectivity and the API endpoint, then retry".to_string()
            }
            AnalystError::CsvError(_) => {
                "Verify the input file is well-formed CSV with a header row".to_string()
            }
            AnalystError::IoError(_) => {
                "Check file permissions and available disk space".to_string()
            }
            AnalystError::SerializationError(_) => {
                "Inspect the analysis output for non-serializable values".to_string()
            }
            AnalystError::ZipError(_) => {
                "Check available disk space and retry the bundle step".to_string()
            }
            AnalystError::MissingConfigError { field } => {
                format!("Provide a value for '{}' via CLI flag or environment", field)
            }
            AnalystError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and run again", field)
            }
            AnalystError::ConfigValidationError { field, .. } => {
                format!("Review the '{}' section of the configuration", field)
            }
            AnalystError::DatasetValidationError { .. } => {
                "Use a dataset that meets the minimum row and column thresholds, \
                 or lower the thresholds explicitly"
                    .to_string()
            }
            AnalystError::ProcessingError { .. } => {
                "Re-run with --verbose to see which analysis step failed".to_string()
            }
            AnalystError::ReportError { .. } => {
                "Verify the GEMINI_API_KEY is valid; the analysis bundle is still usable"
                    .to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AnalystError::ApiError(_) => "Could not reach the generative AI service".to_string(),
            AnalystError::CsvError(_) => "The input file could not be read as CSV".to_string(),
            AnalystError::IoError(e) => format!("File system operation failed: {}", e),
            AnalystError::SerializationError(_) => {
                "Failed to serialize the analysis results".to_string()
            }
            AnalystError::ZipError(_) => "Failed to create the analysis bundle".to_string(),
            AnalystError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            AnalystError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => {
                format!("'{}' is not a valid value for '{}': {}", value, field, reason)
            }
            AnalystError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            AnalystError::DatasetValidationError { reason } => {
                format!("The dataset does not meet the minimum requirements: {}", reason)
            }
            AnalystError::ProcessingError { message } => {
                format!("Analysis failed: {}", message)
            }
            AnalystError::ReportError { message } => {
                format!("AI report unavailable: {}", message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalystError>;
