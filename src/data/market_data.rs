/// Market data provider interface and the bulk dataset it returns
use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;

use crate::error::{Result, ScannerError};
use crate::types::{Bar, SymbolSeries, Timeframe};

/// Bulk price history source.
///
/// Implementations may omit symbols they cannot resolve and may fail the
/// whole call; callers treat both as recoverable.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_bars(
        &self,
        symbols: &[String],
        lookback: Duration,
        timeframe: Timeframe,
    ) -> Result<MarketDataset>;
}

/// Raw bars for a batch of symbols, keyed by symbol
#[derive(Debug, Clone, Default)]
pub struct MarketDataset {
    bars: HashMap<String, Vec<Bar>>,
}

impl MarketDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.bars.insert(symbol.into(), bars);
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.bars.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(String::as_str)
    }

    /// Close prices in provider order
    pub fn closes(&self, symbol: &str) -> Option<Vec<f64>> {
        self.bars.get(symbol).map(|bars| bars.iter().map(|b| b.close).collect())
    }

    /// Open prices in provider order
    pub fn opens(&self, symbol: &str) -> Option<Vec<f64>> {
        self.bars.get(symbol).map(|bars| bars.iter().map(|b| b.open).collect())
    }

    /// Select the clean series for one symbol.
    ///
    /// `SymbolMissing` when the provider did not return the symbol,
    /// `InvalidBarData` when it returned nothing usable.
    pub fn extract(&self, symbol: &str) -> Result<SymbolSeries> {
        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| ScannerError::SymbolMissing(symbol.to_string()))?;

        if bars.iter().any(|b| b.close.is_infinite() || b.open.is_infinite()) {
            return Err(ScannerError::InvalidBarData(format!(
                "{}: non-finite price in response",
                symbol
            )));
        }

        let series = SymbolSeries::from_bars(symbol, bars.clone());
        if series.is_empty() && !bars.is_empty() {
            return Err(ScannerError::InvalidBarData(format!(
                "{}: no bar carries a close price",
                symbol
            )));
        }

        Ok(series)
    }
}
