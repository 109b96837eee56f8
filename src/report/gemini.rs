use crate::domain::model::DatasetSummary;
use crate::utils::error::{AnalystError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Models advertised in the CLI help; any non-empty model name is accepted.
pub const KNOWN_MODELS: [&str; 4] = [
    "gemini-2.5-flash",
    "gemini-2.0-flash-exp",
    "gemini-1.5-flash",
    "gemini-1.5-pro",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiReporter {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiReporter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generates the Markdown analyst report for a dataset summary.
    pub async fn generate(&self, summary: &DatasetSummary) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(summary),
                }],
            }],
        };

        tracing::debug!("🧠 Requesting report from model {}", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(AnalystError::ReportError {
                message: format!("model endpoint returned {}: {}", status, detail),
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        extract_text(&body).ok_or_else(|| AnalystError::ReportError {
            message: "response contained no report text".to_string(),
        })
    }
}

fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .map(|part| part.text.as_str())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Assembles the analyst prompt from the statistical digest.
pub fn build_prompt(summary: &DatasetSummary) -> String {
    let correlations = if summary.top_correlations.is_empty() {
        "none (fewer than two numeric columns)".to_string()
    } else {
        summary
            .top_correlations
            .iter()
            .map(|pair| format!("{} vs {}: {}", pair.left, pair.right, pair.r))
            .collect::<Vec<_>>()
            .join("; ")
    };

    let modes = if summary.categorical_modes.is_empty() {
        "none".to_string()
    } else {
        summary
            .categorical_modes
            .iter()
            .map(|(column, mode)| format!("{}: {}", column, mode))
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        "Act as a senior data scientist. Analyze the dataset '{name}'.\n\
         \n\
         STATISTICAL METADATA:\n\
         - Dimensions: {rows} rows x {columns} columns\n\
         - Average missing values: {missing:.2}%\n\
         - Outliers detected (IQR): {outliers}\n\
         - Top correlations (Pearson, sign preserved): {correlations}\n\
         - Categorical modes: {modes}\n\
         \n\
         REPORT STRUCTURE (Markdown):\n\
         Executive summary (overall data health).\n\
         3 key findings (interpret correlations, outliers and modes in business terms).\n\
         3 data cleaning and preprocessing recommendations.\n",
        name = summary.dataset_name,
        rows = summary.rows,
        columns = summary.columns,
        missing = summary.missing_avg_percent,
        outliers = summary.total_outliers,
        correlations = correlations,
        modes = modes,
    )
}

/// File name for the persisted report, extension stripped from the dataset name.
pub fn report_file_name(dataset_name: &str) -> String {
    let stem = dataset_name.split('.').next().unwrap_or(dataset_name);
    format!("report_{}.md", stem)
}
