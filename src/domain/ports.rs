use crate::domain::model::{AnalysisOutput, Dataset};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn model(&self) -> &str;
    /// `None` disables AI report generation
    fn api_key(&self) -> Option<&str>;
    fn api_base_url(&self) -> &str;
    fn min_rows(&self) -> usize;
    fn min_columns(&self) -> usize;
    fn report_enabled(&self) -> bool;
    fn bundle_enabled(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, dataset: Dataset) -> Result<AnalysisOutput>;
    async fn load(&self, output: AnalysisOutput) -> Result<String>;
}
