pub mod analysis;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::cli::LocalStorage;
pub use config::toml_config::ProfileConfig;

pub use crate::core::{engine::AnalysisEngine, pipeline::AnalysisPipeline};
pub use report::GeminiReporter;
pub use utils::error::{AnalystError, Result};
