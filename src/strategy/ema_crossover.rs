/// EMA crossover detector
/// Classifies the latest bar of a symbol as a fast/slow EMA crossover

use tracing::debug;

use crate::error::{Result, ScannerError};
use crate::strategy::indicators::{ema_series, last_two};
use crate::types::{CrossoverDirection, CrossoverEvent, SymbolSeries};

pub const DEFAULT_FAST_SPAN: usize = 9;
pub const DEFAULT_SLOW_SPAN: usize = 21;

/// Fast/slow EMA crossover detector with open-price confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverDetector {
    fast_span: usize,
    slow_span: usize,
}

impl Default for CrossoverDetector {
    fn default() -> Self {
        Self {
            fast_span: DEFAULT_FAST_SPAN,
            slow_span: DEFAULT_SLOW_SPAN,
        }
    }
}

impl CrossoverDetector {
    pub fn new(fast_span: usize, slow_span: usize) -> Result<Self> {
        if fast_span == 0 || fast_span >= slow_span {
            return Err(ScannerError::InvalidParameter(format!(
                "EMA spans must satisfy 0 < fast < slow (got {}/{})",
                fast_span, slow_span
            )));
        }
        Ok(Self {
            fast_span,
            slow_span,
        })
    }

    pub fn fast_span(&self) -> usize {
        self.fast_span
    }

    pub fn slow_span(&self) -> usize {
        self.slow_span
    }

    /// Bars needed before the slow EMA is considered stable
    pub fn min_observations(&self) -> usize {
        self.slow_span + 1
    }

    /// Classify the latest bar of `series`.
    ///
    /// Returns `None` for insufficient history, NaN-poisoned EMAs, a missing
    /// latest open, or simply no crossover.
    pub fn classify(&self, series: &SymbolSeries) -> Option<CrossoverEvent> {
        if series.len() < self.min_observations() {
            debug!(
                "{}: Not enough bars ({} < {})",
                series.symbol(),
                series.len(),
                self.min_observations()
            );
            return None;
        }

        let closes = series.closes();
        let fast = ema_series(&closes, self.fast_span);
        let slow = ema_series(&closes, self.slow_span);

        let (prev_fast, curr_fast) = last_two(&fast)?;
        let (prev_slow, curr_slow) = last_two(&slow)?;

        if [prev_fast, curr_fast, prev_slow, curr_slow]
            .iter()
            .any(|v| v.is_nan())
        {
            debug!("{}: EMA values are NaN, skipping", series.symbol());
            return None;
        }

        let latest = series.latest()?;
        let latest_open = series.latest_open();
        let direction =
            detect_crossover(prev_fast, prev_slow, curr_fast, curr_slow, latest_open)?;

        debug!(
            "{} {} crossover: EMA{} {:.2} / EMA{} {:.2}, open {:.2}",
            series.symbol(),
            direction.as_str(),
            self.fast_span,
            curr_fast,
            self.slow_span,
            curr_slow,
            latest_open
        );

        Some(CrossoverEvent {
            symbol: series.symbol().to_string(),
            direction,
            timestamp: latest.timestamp,
            fast_ema: curr_fast,
            slow_ema: curr_slow,
            latest_open,
        })
    }
}

/// Classify with the default 9/21 spans
pub fn classify(series: &SymbolSeries) -> Option<CrossoverEvent> {
    CrossoverDetector::default().classify(series)
}

/// Detect a confirmed crossover between the previous and current EMA pair.
///
/// The latest open must sit on the breakout side of the fast EMA; a NaN
/// open fails both comparisons and suppresses the event.
pub fn detect_crossover(
    prev_fast: f64,
    prev_slow: f64,
    curr_fast: f64,
    curr_slow: f64,
    latest_open: f64,
) -> Option<CrossoverDirection> {
    // Bullish: fast was at or below slow, now above
    if prev_fast <= prev_slow && curr_fast > curr_slow {
        return (latest_open > curr_fast).then_some(CrossoverDirection::Bullish);
    }

    // Bearish: fast was at or above slow, now below
    if prev_fast >= prev_slow && curr_fast < curr_slow {
        return (latest_open < curr_fast).then_some(CrossoverDirection::Bearish);
    }

    None
}
