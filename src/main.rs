use clap::Parser;
use std::time::Duration;
use stream_scout::core::ConfigProvider;
use stream_scout::utils::error::ErrorSeverity;
use stream_scout::utils::{logger, validation::Validate};
use stream_scout::{
    AvailabilityPipeline, CliConfig, JustWatchClient, LocalStorage, ScoutEngine, ScoutError,
    TomlConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting stream-scout CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let result = match config.config.clone() {
        Some(path) => {
            tracing::info!("📄 Loading configuration from: {}", path);
            match TomlConfig::from_file(&path) {
                Ok(toml_config) => run(toml_config, monitor_enabled).await,
                Err(e) => Err(e),
            }
        }
        None => run(config, monitor_enabled).await,
    };

    match result {
        Ok(destination) => {
            tracing::info!("✅ Availability check completed successfully!");
            tracing::info!("📁 Report written to: {}", destination);
        }
        Err(e) => {
            tracing::error!(
                "❌ Availability check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(config: C, monitor_enabled: bool) -> Result<String, ScoutError> {
    // 驗證配置
    config.validate()?;

    let client = JustWatchClient::new(
        config.api_endpoint(),
        Duration::from_secs(config.request_timeout_secs()),
    )?
    .with_language(config.language());

    let storage = LocalStorage::new(".".to_string());
    let pipeline = AvailabilityPipeline::new(storage, config, client);

    let engine = ScoutEngine::new_with_monitoring(pipeline, monitor_enabled);
    engine.run().await
}
