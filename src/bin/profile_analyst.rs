use anyhow::Result;
use auto_analyst::config::toml_config::ProfileConfig;
use auto_analyst::domain::ports::ConfigProvider;
use auto_analyst::utils::{logger, validation::Validate};
use auto_analyst::{AnalysisEngine, AnalysisPipeline, LocalStorage};
use clap::Parser;

#[derive(Parser)]
#[command(name = "profile-analyst")]
#[command(about = "Dataset analysis driven by a TOML profile")]
struct Args {
    /// Path to the TOML profile
    #[arg(short, long, default_value = "analyst-profile.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from the profile
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the bundle setting from the profile
    #[arg(long)]
    bundle: Option<bool>,

    /// Dry run - show what would be analyzed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting profile-based analysis");
    tracing::info!("📁 Loading profile from: {}", args.config);

    let mut config = match ProfileConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load profile '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if let Some(bundle) = args.bundle {
        config.output.bundle = Some(bundle);
        tracing::info!("🔧 Bundle output overridden to: {}", bundle);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Profile validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    config.resolve_api_key();

    tracing::info!("✅ Profile loaded and validated successfully");

    display_profile_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No analysis will run");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let pipeline = AnalysisPipeline::new(storage, config);

    let engine = AnalysisEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Analysis completed successfully!");
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

fn display_profile_summary(config: &ProfileConfig, args: &Args) {
    println!("📋 Profile Summary:");
    println!(
        "  Profile: {} v{}",
        config.profile.name, config.profile.version
    );
    println!("  Dataset: {}", config.input_path());
    println!(
        "  Thresholds: {} rows x {} columns minimum",
        config.min_rows(),
        config.min_columns()
    );
    println!("  Output: {}", config.output_path());
    println!("  Bundle: {}", config.bundle_enabled());

    if config.report_enabled() {
        println!("  Report model: {}", config.model());
        println!(
            "  API key: {}",
            if config.api_key().is_some() {
                "configured"
            } else {
                "not configured (report will be skipped)"
            }
        );
    } else {
        println!("  Report: disabled");
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
