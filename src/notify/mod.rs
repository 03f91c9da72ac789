/// Outbound alert delivery
use async_trait::async_trait;

use crate::data::display_symbol;
use crate::error::Result;
use crate::types::{CrossoverDirection, Timeframe};

pub mod telegram;

pub use telegram::TelegramNotifier;

/// Delivers a text message to a messaging endpoint
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Build one aggregate alert: a direction header, then one bullet per symbol
pub fn format_alert(
    direction: CrossoverDirection,
    timeframe: Timeframe,
    symbols: &[String],
    suffix: &str,
) -> String {
    let header = match direction {
        CrossoverDirection::Bullish => format!("📈 {} Bullish EMA Crossover:", timeframe.label()),
        CrossoverDirection::Bearish => format!("📉 {} Bearish EMA Crossover:", timeframe.label()),
    };

    let mut lines = Vec::with_capacity(symbols.len() + 1);
    lines.push(header);
    lines.extend(symbols.iter().map(|s| format!("• {}", display_symbol(s, suffix))));
    lines.join("\n")
}

/// Message announcing that the scanner is up
pub fn format_startup(timeframe: Timeframe, symbol_count: usize, fast_span: usize, slow_span: usize) -> String {
    format!(
        "🔄 {} EMA Scanner Started - Monitoring {} stocks for {}/{} crossovers",
        timeframe.label(),
        symbol_count,
        fast_span,
        slow_span
    )
}
