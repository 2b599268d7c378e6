use clap::Parser;
use meroshare_ipo::utils::{logger, validation::Validate};
use meroshare_ipo::{
    ChromiumDriver, CliArgs, EngineOptions, Environment, IpoEngine, LaunchOptions, PortalError,
    Settings,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting meroshare-ipo");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    match run(args).await {
        Ok(()) => {}
        Err(PortalError::Interrupted) => {
            tracing::info!("Operation interrupted by user");
        }
        Err(e) => {
            tracing::error!("❌ An error occurred: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}

/// 收到 Ctrl-C 時完成；無法註冊訊號處理時永不完成
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn run(args: CliArgs) -> Result<(), PortalError> {
    let mode = args.run_mode();

    let mut settings = Settings::load(args.config.as_deref())?;
    if args.headless {
        settings.browser.headless = true;
    }
    settings.validate()?;

    let environment = Environment::load(&mode)?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let launch_options = LaunchOptions::from(&settings.browser);
    let driver = tokio::select! {
        driver = ChromiumDriver::launch(&launch_options) => driver?,
        () = interrupted() => return Err(PortalError::Interrupted),
    };
    let mut engine = IpoEngine::new(driver, EngineOptions::from(&settings), environment);

    // 中斷時由引擎負責關閉瀏覽器
    let report = engine.run_until(&mode, interrupted()).await?;
    for applied in &report.applied {
        tracing::info!("📄 {}: {}", applied.company_name, applied.confirmation);
    }

    Ok(())
}
