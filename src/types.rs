/// Core type definitions for the scanner
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// OHLCV Bar data structure
///
/// Prices the provider could not supply are `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Bar carrying only the fields the crossover engine reads
    pub fn from_open_close(timestamp: DateTime<Utc>, open: f64, close: f64) -> Self {
        Bar {
            timestamp,
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 0,
        }
    }
}

/// Bar granularity requested from the market data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Hourly,
}

impl Timeframe {
    pub fn as_str(&self) -> &str {
        match self {
            Timeframe::Daily => "1d",
            Timeframe::Hourly => "1h",
        }
    }

    /// Human-readable label used in alert headers
    pub fn label(&self) -> &str {
        match self {
            Timeframe::Daily => "Daily",
            Timeframe::Hourly => "1-Hour",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "1d" | "day" => Some(Timeframe::Daily),
            "hourly" | "1h" | "hour" => Some(Timeframe::Hourly),
            _ => None,
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Hourly
    }
}

/// Ordered, de-duplicated price history for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSeries {
    symbol: String,
    bars: Vec<Bar>,
    latest_open: f64,
}

impl SymbolSeries {
    /// Select a clean series from raw provider bars.
    ///
    /// Bars without a finite close are dropped, the rest are sorted by
    /// timestamp and duplicate timestamps collapse to the last one seen.
    /// The latest open is taken from the newest raw bar before any bar is
    /// dropped, so a trailing bar with a missing close still supplies it.
    pub fn from_bars(symbol: impl Into<String>, mut raw: Vec<Bar>) -> Self {
        // stable sort keeps provider order among equal timestamps
        raw.sort_by_key(|b| b.timestamp);
        let latest_open = raw.last().map_or(f64::NAN, |b| b.open);

        let mut deduped: Vec<Bar> = Vec::with_capacity(raw.len());
        for bar in raw.into_iter().filter(|b| b.close.is_finite()) {
            match deduped.last_mut() {
                Some(last) if last.timestamp == bar.timestamp => *last = bar,
                _ => deduped.push(bar),
            }
        }

        SymbolSeries {
            symbol: symbol.into(),
            bars: deduped,
            latest_open,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Open of the newest raw bar; NaN when the provider left it blank
    pub fn latest_open(&self) -> f64 {
        self.latest_open
    }
}

/// Crossover direction of the fast EMA relative to the slow EMA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossoverDirection {
    Bullish,
    Bearish,
}

impl CrossoverDirection {
    pub fn as_str(&self) -> &str {
        match self {
            CrossoverDirection::Bullish => "BULLISH",
            CrossoverDirection::Bearish => "BEARISH",
        }
    }
}

impl fmt::Display for CrossoverDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Crossover detected on the latest bar of a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    pub symbol: String,
    pub direction: CrossoverDirection,
    pub timestamp: DateTime<Utc>,
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub latest_open: f64,
}

/// Outcome of one scan invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub bullish: Vec<String>,
    pub bearish: Vec<String>,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    pub symbols_evaluated: usize,
    pub symbols_skipped: usize,
    pub errors: Vec<String>,
}

impl ScanResult {
    pub fn new(timeframe: Timeframe) -> Self {
        ScanResult {
            scan_id: Uuid::new_v4(),
            started_at: Utc::now(),
            timeframe,
            bullish: Vec::new(),
            bearish: Vec::new(),
            chunks_total: 0,
            chunks_failed: 0,
            symbols_evaluated: 0,
            symbols_skipped: 0,
            errors: Vec::new(),
        }
    }

    /// Record a detected crossover. Returns false if the symbol was already recorded.
    pub fn record(&mut self, symbol: &str, direction: CrossoverDirection) -> bool {
        let set = match direction {
            CrossoverDirection::Bullish => &mut self.bullish,
            CrossoverDirection::Bearish => &mut self.bearish,
        };
        if set.iter().any(|s| s == symbol) {
            return false;
        }
        set.push(symbol.to_string());
        true
    }

    pub fn symbols(&self, direction: CrossoverDirection) -> &[String] {
        match direction {
            CrossoverDirection::Bullish => &self.bullish,
            CrossoverDirection::Bearish => &self.bearish,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bullish.is_empty() && self.bearish.is_empty()
    }
}
