//! Shared fixtures: in-memory collaborators and canned price histories
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use emascan::data::{MarketDataProvider, MarketDataset};
use emascan::notify::NotificationSink;
use emascan::{Bar, Result, ScannerError, Timeframe};

/// Hourly bars starting at the 9:15 IST open on 2025-01-15
pub fn bars_from(closes: &[f64], opens: &[f64]) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2025, 1, 15, 3, 45, 0).unwrap();
    closes
        .iter()
        .zip(opens)
        .enumerate()
        .map(|(i, (&close, &open))| Bar::from_open_close(start + Duration::hours(i as i64), open, close))
        .collect()
}

/// Flat at 100 for 29 bars, then a confirmed upside breakout
pub fn bullish_bars() -> Vec<Bar> {
    breakout(110.0, 105.0)
}

/// Flat at 100 for 29 bars, then a confirmed downside breakdown
pub fn bearish_bars() -> Vec<Bar> {
    breakout(90.0, 95.0)
}

pub fn flat_bars(len: usize) -> Vec<Bar> {
    bars_from(&vec![100.0; len], &vec![100.0; len])
}

fn breakout(last_close: f64, last_open: f64) -> Vec<Bar> {
    let mut closes = vec![100.0; 29];
    closes.push(last_close);
    let mut opens = vec![100.0; 29];
    opens.push(last_open);
    bars_from(&closes, &opens)
}

pub fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Provider serving canned bars; chunks containing a `failing` symbol error out
#[derive(Default)]
pub struct MockProvider {
    bars: HashMap<String, Vec<Bar>>,
    stray: HashMap<String, Vec<Bar>>,
    failing: HashSet<String>,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    /// Bars returned with every chunk, whether requested or not
    pub fn with_stray_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.stray.insert(symbol.to_string(), bars);
        self
    }

    pub fn failing_on(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_bars(
        &self,
        symbols: &[String],
        _lookback: Duration,
        _timeframe: Timeframe,
    ) -> Result<MarketDataset> {
        self.calls.lock().unwrap().push(symbols.to_vec());

        if symbols.iter().any(|s| self.failing.contains(s)) {
            return Err(ScannerError::DataUnavailable("provider offline".to_string()));
        }

        let mut dataset = MarketDataset::new();
        for symbol in symbols {
            if let Some(bars) = self.bars.get(symbol) {
                dataset.insert(symbol.clone(), bars.clone());
            }
        }
        for (symbol, bars) in &self.stray {
            dataset.insert(symbol.clone(), bars.clone());
        }
        Ok(dataset)
    }
}

/// Sink recording every message; optionally failing each delivery
#[derive(Default)]
pub struct RecordingSink {
    fail: bool,
    pub messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        RecordingSink {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, text: &str) -> Result<()> {
        self.messages.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(ScannerError::NotificationFailed("sink down".to_string()));
        }
        Ok(())
    }
}
