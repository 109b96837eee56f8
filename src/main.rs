use anyhow::Result;
use auto_analyst::report::gemini::KNOWN_MODELS;
use auto_analyst::utils::{logger, validation::Validate};
use auto_analyst::{AnalysisEngine, AnalysisPipeline, CliConfig, LocalStorage};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GEMINI_API_KEY from a local .env if one exists
    dotenvy::dotenv().ok();

    let mut config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting auto-analyst CLI");
    if config.verbose {
        // The API key stays out of the logs
        tracing::debug!(
            "CLI config: input={}, output={}, model={}, min_rows={}, min_columns={}",
            config.input,
            config.output_path,
            config.model,
            config.min_rows,
            config.min_columns
        );
    }

    config.resolve_api_key();
    if config.api_key.is_none() {
        tracing::warn!("⚠️ GEMINI_API_KEY not configured - the AI report will be skipped");
    }
    if !KNOWN_MODELS.contains(&config.model.as_str()) {
        tracing::info!("Model '{}' is not in the known list, using it as-is", config.model);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // Paths in the config are resolved relative to the working directory
    let storage = LocalStorage::new(".");
    let pipeline = AnalysisPipeline::new(storage, config);

    let engine = AnalysisEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Analysis completed successfully!");
            tracing::info!("📁 Artifacts saved to: {}", output_path);
            println!("✅ Analysis completed successfully!");
            println!("📁 Artifacts saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                auto_analyst::utils::error::ErrorSeverity::Low => 0,
                auto_analyst::utils::error::ErrorSeverity::Medium => 2,
                auto_analyst::utils::error::ErrorSeverity::High => 1,
                auto_analyst::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
