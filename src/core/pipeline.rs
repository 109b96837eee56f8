use crate::analysis::{charts, loader, stats};
use crate::core::{AnalysisOutput, ConfigProvider, Dataset, Pipeline, Storage};
use crate::domain::model::{DatasetSummary, ReportArtifact};
use crate::report::gemini::{self, GeminiReporter};
use crate::utils::error::Result;
use chrono::Utc;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// The end-to-end analysis pipeline: CSV ingest, statistical analysis with
/// chart data, optional AI report, artifact persistence.
pub struct AnalysisPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    reporter: Option<GeminiReporter>,
}

impl<S: Storage, C: ConfigProvider> AnalysisPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let reporter = if config.report_enabled() {
            config
                .api_key()
                .map(|key| GeminiReporter::new(key, config.model(), config.api_base_url()))
        } else {
            None
        };

        Self {
            storage,
            config,
            reporter,
        }
    }

    fn dataset_name(&self) -> String {
        Path::new(self.config.input_path())
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("dataset")
            .to_string()
    }

    async fn generate_report(&self, summary: &DatasetSummary) -> Option<ReportArtifact> {
        let Some(reporter) = &self.reporter else {
            if self.config.report_enabled() {
                tracing::warn!("⚠️ No API key configured - the AI report will not be generated");
            } else {
                tracing::info!("AI report generation disabled");
            }
            return None;
        };

        tracing::info!("🧠 Generating report with {}...", reporter.model());
        match reporter.generate(summary).await {
            Ok(markdown) => Some(ReportArtifact {
                file_name: gemini::report_file_name(&summary.dataset_name),
                model: reporter.model().to_string(),
                markdown,
            }),
            Err(e) => {
                // The analysis artifacts stay usable without the report
                tracing::error!("❌ AI report generation failed: {}", e);
                None
            }
        }
    }

    fn build_bundle(&self, output: &AnalysisOutput) -> Result<Vec<u8>> {
        let summary_json = serde_json::to_string_pretty(&output.summary)?;
        let charts_json = serde_json::to_string_pretty(&output.charts)?;

        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
        zip.write_all(summary_json.as_bytes())?;

        zip.start_file::<_, ()>("charts.json", FileOptions::default())?;
        zip.write_all(charts_json.as_bytes())?;

        if let Some(report) = &output.report {
            zip.start_file::<_, ()>(format!("reports/{}", report.file_name), FileOptions::default())?;
            zip.write_all(report.markdown.as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AnalysisPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        tracing::debug!("Reading dataset from: {}", self.config.input_path());
        let bytes = self.storage.read_file(self.config.input_path()).await?;

        let options = loader::LoaderOptions {
            min_rows: self.config.min_rows(),
            min_columns: self.config.min_columns(),
        };

        loader::parse_dataset(&self.dataset_name(), &bytes, &options)
    }

    async fn transform(&self, dataset: Dataset) -> Result<AnalysisOutput> {
        let missing = stats::missing_summary(&dataset);
        let correlation = stats::correlations(&dataset, stats::TOP_CORRELATIONS);
        let modes = stats::categorical_modes(&dataset);
        let total_outliers = stats::total_iqr_outliers(&dataset);

        tracing::debug!(
            "Stats computed: avg missing {:.2}%, {} outliers, {} top correlations",
            missing.average_percent,
            total_outliers,
            correlation.as_ref().map(|c| c.top.len()).unwrap_or(0)
        );

        let summary = DatasetSummary {
            dataset_name: dataset.name.clone(),
            rows: dataset.rows,
            columns: dataset.columns.len(),
            numeric_columns: dataset.numeric_columns.len(),
            categorical_columns: dataset.categorical_columns.len(),
            missing_avg_percent: missing.average_percent,
            missing_by_column: missing.by_column,
            total_outliers,
            top_correlations: correlation
                .as_ref()
                .map(|c| c.top.clone())
                .unwrap_or_default(),
            categorical_modes: modes,
            generated_at: Utc::now(),
        };

        let charts = charts::build_charts(&dataset, correlation.as_ref());
        let report = self.generate_report(&summary).await;

        Ok(AnalysisOutput {
            summary,
            charts,
            report,
        })
    }

    async fn load(&self, output: AnalysisOutput) -> Result<String> {
        let dir = format!(
            "{}/{}",
            self.config.output_path(),
            output.summary.dataset_name
        );

        let summary_json = serde_json::to_string_pretty(&output.summary)?;
        self.storage
            .write_file(&format!("{}/summary.json", dir), summary_json.as_bytes())
            .await?;

        let charts_json = serde_json::to_string_pretty(&output.charts)?;
        self.storage
            .write_file(&format!("{}/charts.json", dir), charts_json.as_bytes())
            .await?;

        if let Some(report) = &output.report {
            self.storage
                .write_file(
                    &format!("{}/reports/{}", dir, report.file_name),
                    report.markdown.as_bytes(),
                )
                .await?;
        }

        if self.config.bundle_enabled() {
            let bundle = self.build_bundle(&output)?;
            tracing::debug!("Writing bundle ({} bytes)", bundle.len());
            self.storage
                .write_file(&format!("{}/analysis_bundle.zip", dir), &bundle)
                .await?;
        }

        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AnalystError;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AnalystError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        input_path: String,
        output_path: String,
        model: String,
        api_key: Option<String>,
        api_base_url: String,
        min_rows: usize,
        min_columns: usize,
        report_enabled: bool,
        bundle_enabled: bool,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                input_path: "input.csv".to_string(),
                output_path: "analysis".to_string(),
                model: "gemini-2.5-flash".to_string(),
                api_key: None,
                api_base_url: "http://localhost".to_string(),
                min_rows: 1,
                min_columns: 1,
                report_enabled: true,
                bundle_enabled: false,
            }
        }

        fn with_api(base_url: String) -> Self {
            Self {
                api_key: Some("test-key".to_string()),
                api_base_url: base_url,
                ..Self::new()
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
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
            self.report_enabled
        }

        fn bundle_enabled(&self) -> bool {
            self.bundle_enabled
        }
    }

    fn sample_csv() -> String {
        let mut csv = String::from("amount,price,city\n");
        for i in 0..30 {
            let price = if i % 10 == 0 {
                String::new()
            } else {
                format!("{}", i * 2)
            };
            let city = if i % 3 == 0 { "Lima" } else { "Quito" };
            csv.push_str(&format!("{},{},{}\n", i, price, city));
        }
        csv
    }

    async fn pipeline_with_csv(
        config: MockConfig,
    ) -> (AnalysisPipeline<MockStorage, MockConfig>, MockStorage) {
        let storage = MockStorage::new();
        storage.put_file("input.csv", sample_csv().as_bytes()).await;
        (AnalysisPipeline::new(storage.clone(), config), storage)
    }

    #[tokio::test]
    async fn test_extract_parses_and_classifies() {
        let (pipeline, _storage) = pipeline_with_csv(MockConfig::new()).await;

        let dataset = pipeline.extract().await.unwrap();

        assert_eq!(dataset.name, "input");
        assert_eq!(dataset.rows, 30);
        assert_eq!(dataset.numeric_columns, vec!["amount", "price"]);
        assert_eq!(dataset.categorical_columns, vec!["city"]);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_io_error() {
        let storage = MockStorage::new();
        let pipeline = AnalysisPipeline::new(storage, MockConfig::new());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AnalystError::IoError(_)));
    }

    #[tokio::test]
    async fn test_extract_enforces_thresholds() {
        let config = MockConfig {
            min_rows: 2000,
            min_columns: 10,
            ..MockConfig::new()
        };
        let (pipeline, _storage) = pipeline_with_csv(config).await;

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AnalystError::DatasetValidationError { .. }));
    }

    #[tokio::test]
    async fn test_transform_without_key_skips_report() {
        let (pipeline, _storage) = pipeline_with_csv(MockConfig::new()).await;

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();

        assert!(output.report.is_none());
        assert_eq!(output.summary.rows, 30);
        assert_eq!(output.summary.columns, 3);
        // 'price' has 3 empty cells out of 30
        assert_eq!(output.summary.missing_by_column.len(), 1);
        assert!((output.summary.missing_avg_percent - 10.0).abs() < 1e-9);
        assert_eq!(
            output.summary.categorical_modes.get("city").map(String::as_str),
            Some("Quito")
        );
        assert_eq!(output.charts.distributions.len(), 2);
        assert_eq!(output.charts.frequencies.len(), 1);
        assert!(output.charts.correlation.is_some());
    }

    #[tokio::test]
    async fn test_transform_with_key_generates_report() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent")
                .header("x-goog-api-key", "test-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "candidates": [
                        {"content": {"parts": [{"text": "# Analyst Report"}]}}
                    ]
                }));
        });

        let (pipeline, _storage) =
            pipeline_with_csv(MockConfig::with_api(server.base_url())).await;

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();

        api_mock.assert();
        let report = output.report.unwrap();
        assert_eq!(report.file_name, "report_input.md");
        assert_eq!(report.markdown, "# Analyst Report");
        assert_eq!(report.model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_transform_report_failure_is_non_fatal() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(500);
        });

        let (pipeline, _storage) =
            pipeline_with_csv(MockConfig::with_api(server.base_url())).await;

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();

        api_mock.assert();
        assert!(output.report.is_none());
        assert_eq!(output.summary.rows, 30);
    }

    #[tokio::test]
    async fn test_report_disabled_skips_api_call() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path_contains("generateContent");
            then.status(200);
        });

        let config = MockConfig {
            report_enabled: false,
            ..MockConfig::with_api(server.base_url())
        };
        let (pipeline, _storage) = pipeline_with_csv(config).await;

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();

        api_mock.assert_hits(0);
        assert!(output.report.is_none());
    }

    #[tokio::test]
    async fn test_load_writes_artifacts() {
        let (pipeline, storage) = pipeline_with_csv(MockConfig::new()).await;

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();
        let path = pipeline.load(output).await.unwrap();

        assert_eq!(path, "analysis/input");

        let summary_bytes = storage.get_file("analysis/input/summary.json").await.unwrap();
        let summary: serde_json::Value = serde_json::from_slice(&summary_bytes).unwrap();
        assert_eq!(summary["rows"], 30);

        let charts_bytes = storage.get_file("analysis/input/charts.json").await.unwrap();
        let charts: serde_json::Value = serde_json::from_slice(&charts_bytes).unwrap();
        assert!(charts["distributions"].as_array().unwrap().len() == 2);

        // No report and no bundle were requested
        assert!(storage
            .get_file("analysis/input/reports/report_input.md")
            .await
            .is_none());
        assert!(storage
            .get_file("analysis/input/analysis_bundle.zip")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_load_writes_report_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash:generateContent");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "candidates": [
                        {"content": {"parts": [{"text": "report body"}]}}
                    ]
                }));
        });

        let (pipeline, storage) =
            pipeline_with_csv(MockConfig::with_api(server.base_url())).await;

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();
        pipeline.load(output).await.unwrap();

        let report = storage
            .get_file("analysis/input/reports/report_input.md")
            .await
            .unwrap();
        assert_eq!(String::from_utf8(report).unwrap(), "report body");
    }

    #[tokio::test]
    async fn test_load_with_bundle() {
        let config = MockConfig {
            bundle_enabled: true,
            ..MockConfig::new()
        };
        let (pipeline, storage) = pipeline_with_csv(config).await;

        let dataset = pipeline.extract().await.unwrap();
        let output = pipeline.transform(dataset).await.unwrap();
        pipeline.load(output).await.unwrap();

        let zip_bytes = storage
            .get_file("analysis/input/analysis_bundle.zip")
            .await
            .unwrap();
        let cursor = std::io::Cursor::new(zip_bytes);
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();

        // No API key, so the bundle holds only the analysis artifacts
        assert_eq!(file_names, vec!["charts.json", "summary.json"]);
    }
}
