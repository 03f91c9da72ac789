/// Scanner configuration
use chrono::Duration;
use serde::Deserialize;

use crate::error::{Result, ScannerError};
use crate::types::Timeframe;

pub mod loader;

pub use loader::{load_config, ConfigSource, EnvConfigSource, TomlFileSource};

/// Top-level configuration passed into the driver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scanner: ScanConfig,
    pub symbols: SymbolsConfig,
    pub telegram: TelegramConfig,
    pub provider: ProviderConfig,
    pub schedule: ScheduleConfig,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            scanner: ScanConfig::default(),
            symbols: SymbolsConfig::default(),
            telegram: TelegramConfig::default(),
            provider: ProviderConfig::default(),
            schedule: ScheduleConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Parameters of one scan
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub batch_size: usize,
    pub lookback_days: i64,
    pub timeframe: Timeframe,
    pub fast_span: usize,
    pub slow_span: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            batch_size: 50,
            lookback_days: 30,
            timeframe: Timeframe::Hourly,
            fast_span: 9,
            slow_span: 21,
        }
    }
}

impl ScanConfig {
    pub fn lookback(&self) -> Duration {
        Duration::days(self.lookback_days)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SymbolsConfig {
    pub file: String,
    /// Provider-specific suffix appended to every raw symbol
    pub suffix: String,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        SymbolsConfig {
            file: "nifty500.txt".to_string(),
            suffix: ".NS".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        TelegramConfig {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl TelegramConfig {
    /// Startup check: both credentials must be set
    pub fn ensure_present(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.bot_token.trim().is_empty() {
            missing.push("TELEGRAM_BOT_TOKEN");
        }
        if self.chat_id.trim().is_empty() {
            missing.push("TELEGRAM_CHAT_ID");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ScannerError::MissingCredentials(missing.join(", ")))
        }
    }
}

/// Market data provider settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub request_delay_ms: u64,
    pub timeout_sec: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            request_delay_ms: 100,
            timeout_sec: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_minutes: u64,
    pub market_hours_only: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            interval_minutes: 10,
            market_hours_only: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}
