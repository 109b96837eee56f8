use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct AnalysisEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> AnalysisEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting analysis");

        tracing::info!("📥 Loading dataset...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} rows x {} columns ({} numeric, {} categorical)",
            dataset.rows,
            dataset.columns.len(),
            dataset.numeric_columns.len(),
            dataset.categorical_columns.len()
        );
        self.monitor.sample("Extract");

        tracing::info!("📈 Analyzing dataset...");
        let output = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "Computed {} distribution charts and {} frequency charts",
            output.charts.distributions.len(),
            output.charts.frequencies.len()
        );
        self.monitor.sample("Transform");

        tracing::info!("💾 Writing analysis artifacts...");
        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Artifacts saved to: {}", output_path);
        self.monitor.sample("Load");

        self.monitor.summarize();
        Ok(output_path)
    }
}
