/// Main entry point for the EMA crossover scanner
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use emascan::{
    config::{load_config, AppConfig, ConfigSource, EnvConfigSource, LogFormat, TomlFileSource},
    data::{FileSymbolSource, SymbolSource, YahooFinanceClient},
    error::ScannerError,
    notify::{format_startup, NotificationSink, TelegramNotifier},
    time::{is_market_open, next_market_open},
    CrossoverScanner,
};

/// Application state
pub struct ScannerApp {
    config: Arc<AppConfig>,
    scanner: CrossoverScanner,
    notifier: Arc<TelegramNotifier>,
    symbols: Vec<String>,
    shutdown: watch::Receiver<bool>,
}

impl ScannerApp {
    pub fn new(config: AppConfig, shutdown: watch::Receiver<bool>) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        // Notification credentials are a startup requirement
        let notifier = Arc::new(TelegramNotifier::new(&config.telegram)?);

        let symbols = FileSymbolSource::new(&config.symbols.file, config.symbols.suffix.clone())
            .load_symbols()?;
        if symbols.is_empty() {
            return Err(ScannerError::EmptySymbolList(config.symbols.file.clone()).into());
        }

        let provider = Arc::new(YahooFinanceClient::new(&config.provider)?);
        let scanner = CrossoverScanner::new(
            config.scanner.clone(),
            provider,
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
        )?
        .with_symbol_suffix(config.symbols.suffix.clone());

        Ok(ScannerApp {
            config,
            scanner,
            notifier,
            symbols,
            shutdown,
        })
    }

    fn log_banner(&self) {
        let scan = self.scanner.config();
        info!("--- {} EMA Scanner Initialized ---", scan.timeframe.label());
        info!("Scanning {} stocks from '{}'.", self.symbols.len(), self.config.symbols.file);
        info!(
            "Timeframe: {} | EMAs: {}/{} | Batch size: {}",
            scan.timeframe.label(),
            scan.fast_span,
            scan.slow_span,
            scan.batch_size
        );
        info!("Alerts will be sent via Telegram.");
        if self.config.schedule.market_hours_only {
            info!(
                "Scanner will run every {} minutes during market hours.",
                self.config.schedule.interval_minutes
            );
        } else {
            info!("Scanner will run every {} minutes.", self.config.schedule.interval_minutes);
        }
    }

    async fn announce_startup(&self) {
        let scan = &self.config.scanner;
        let message = format_startup(scan.timeframe, self.symbols.len(), scan.fast_span, scan.slow_span);
        if let Err(e) = self.notifier.notify(&message).await {
            warn!("Startup notification failed: {} ({})", e, e.error_code());
        }
    }

    /// Run a single scan regardless of market hours
    pub async fn run_once(&self) {
        let result = self.scanner.run(&self.symbols).await;
        info!(
            "Scan {} finished: {} bullish, {} bearish",
            result.scan_id,
            result.bullish.len(),
            result.bearish.len()
        );
    }

    /// Scan on a fixed interval until Ctrl+C
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.log_banner();
        self.announce_startup().await;

        let interval = std::time::Duration::from_secs(self.config.schedule.interval_minutes * 60);

        loop {
            if *self.shutdown.borrow() {
                info!("Shutdown signal received");
                break;
            }

            let now = chrono::Utc::now();
            if !self.config.schedule.market_hours_only || is_market_open(now) {
                info!("Running scan at {}", now.format("%H:%M:%S"));
                self.run_once().await;
            } else {
                info!(
                    "Outside market hours: {} (next open {})",
                    now.format("%Y-%m-%d %H:%M:%S"),
                    next_market_open(now)
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = self.shutdown.changed() => {
                    // signal listener gone; keep the regular cadence
                    if changed.is_err() {
                        tokio::time::sleep(interval).await;
                    }
                }
            }
        }

        info!("Scanner stopped");
        Ok(())
    }
}

fn select_config_source() -> Box<dyn ConfigSource> {
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&config_path).exists() {
        Box::new(TomlFileSource::new(config_path))
    } else {
        Box::new(EnvConfigSource::new())
    }
}

fn init_logging(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("emascan={},info", config.log_level)));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let source = select_config_source();
    let config = load_config(source.as_ref())?;
    init_logging(&config);
    info!("Configuration loaded from {}", source.describe());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Ctrl+C received - initiating graceful shutdown");
        let _ = shutdown_tx.send(true);
    });

    let mut app = match ScannerApp::new(config, shutdown_rx) {
        Ok(app) => app,
        Err(e) => {
            match e.downcast_ref::<ScannerError>() {
                Some(err) if err.is_startup_failure() => {
                    error!("Cannot start scanner: {} ({})", err, err.error_code())
                }
                _ => error!("Startup failed: {}", e),
            }
            return Err(e);
        }
    };

    if std::env::args().any(|arg| arg == "--once") {
        app.run_once().await;
        return Ok(());
    }

    app.run().await
}
