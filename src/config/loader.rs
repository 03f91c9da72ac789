/// Configuration loading from pluggable backends (TOML file, environment)
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::config::{AppConfig, LogFormat};
use crate::error::{Result, ScannerError};
use crate::types::Timeframe;

/// A backend able to produce an `AppConfig`
pub trait ConfigSource {
    fn load(&self) -> Result<AppConfig>;

    /// Short name used in logs
    fn describe(&self) -> String;
}

/// Reads every section from a TOML file; absent keys keep their defaults
pub struct TomlFileSource {
    path: PathBuf,
}

impl TomlFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TomlFileSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigSource for TomlFileSource {
    fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            return Err(ScannerError::FileNotFound(self.path.display().to_string()));
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ScannerError::ConfigError(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ScannerError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    fn describe(&self) -> String {
        format!("toml:{}", self.path.display())
    }
}

/// Starts from defaults and applies environment variables, loading `.env` first
#[derive(Default)]
pub struct EnvConfigSource;

impl EnvConfigSource {
    pub fn new() -> Self {
        EnvConfigSource
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> Result<AppConfig> {
        let loaded = dotenvy::dotenv().is_ok();
        debug!("dotenv loaded: {}", loaded);

        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn describe(&self) -> String {
        "env".to_string()
    }
}

/// Overlay recognised variables onto `config` using `lookup` to read them
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
        config.telegram.bot_token = token;
    }
    if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
        config.telegram.chat_id = chat_id;
    }
    if let Some(base) = get("TELEGRAM_API_BASE") {
        config.telegram.api_base = base;
    }

    if let Some(v) = get("SCANNER_BATCH_SIZE") {
        config.scanner.batch_size = parse_var("SCANNER_BATCH_SIZE", &v)?;
    }
    if let Some(v) = get("SCANNER_LOOKBACK_DAYS") {
        config.scanner.lookback_days = parse_var("SCANNER_LOOKBACK_DAYS", &v)?;
    }
    if let Some(v) = get("SCANNER_TIMEFRAME") {
        config.scanner.timeframe = Timeframe::from_str(&v).ok_or_else(|| {
            ScannerError::ConfigError(format!("SCANNER_TIMEFRAME: unknown timeframe '{}'", v))
        })?;
    }
    if let Some(v) = get("SCANNER_FAST_SPAN") {
        config.scanner.fast_span = parse_var("SCANNER_FAST_SPAN", &v)?;
    }
    if let Some(v) = get("SCANNER_SLOW_SPAN") {
        config.scanner.slow_span = parse_var("SCANNER_SLOW_SPAN", &v)?;
    }

    if let Some(file) = get("SYMBOLS_FILE") {
        config.symbols.file = file;
    }
    // an explicitly empty suffix is meaningful, so read it unfiltered
    if let Some(suffix) = lookup("SYMBOL_SUFFIX") {
        config.symbols.suffix = suffix.trim().to_string();
    }

    if let Some(url) = get("MARKET_DATA_BASE_URL") {
        config.provider.base_url = url;
    }
    if let Some(v) = get("MARKET_DATA_REQUEST_DELAY_MS") {
        config.provider.request_delay_ms = parse_var("MARKET_DATA_REQUEST_DELAY_MS", &v)?;
    }

    if let Some(v) = get("SCAN_INTERVAL_MINUTES") {
        config.schedule.interval_minutes = parse_var("SCAN_INTERVAL_MINUTES", &v)?;
    }
    if let Some(v) = get("MARKET_HOURS_ONLY") {
        config.schedule.market_hours_only = parse_var("MARKET_HOURS_ONLY", &v)?;
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.log_level = level;
    }
    if let Some(v) = get("LOG_FORMAT") {
        config.log_format = LogFormat::from_str(&v).ok_or_else(|| {
            ScannerError::ConfigError(format!("LOG_FORMAT: unknown format '{}'", v))
        })?;
    }

    Ok(())
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ScannerError::ConfigError(format!("{}: invalid value '{}': {}", key, value, e)))
}

/// Load and validate configuration from any backend
pub fn load_config(source: &dyn ConfigSource) -> Result<AppConfig> {
    let config = source.load()?;
    validate_config(&config)?;
    debug!("Configuration loaded from {}", source.describe());
    Ok(config)
}

pub fn validate_config(config: &AppConfig) -> Result<()> {
    let scanner = &config.scanner;

    if scanner.batch_size == 0 {
        return Err(ScannerError::ConfigError("batch_size must be >= 1".to_string()));
    }

    if scanner.fast_span == 0 || scanner.fast_span >= scanner.slow_span {
        return Err(ScannerError::ConfigError(format!(
            "EMA spans must satisfy 0 < fast_span < slow_span (got {}/{})",
            scanner.fast_span, scanner.slow_span
        )));
    }

    if scanner.lookback_days < 1 {
        return Err(ScannerError::ConfigError(format!(
            "Invalid lookback_days: {}",
            scanner.lookback_days
        )));
    }

    if config.schedule.interval_minutes == 0 {
        return Err(ScannerError::ConfigError(
            "schedule.interval_minutes must be >= 1".to_string(),
        ));
    }

    if config.symbols.file.trim().is_empty() {
        return Err(ScannerError::ConfigError("symbols.file is empty".to_string()));
    }

    Ok(())
}
