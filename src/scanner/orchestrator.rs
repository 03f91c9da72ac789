/// Batch scan orchestrator
/// Fetches price history chunk by chunk, classifies every symbol and sends
/// at most one aggregate alert per crossover direction
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::ScanConfig;
use crate::data::{MarketDataProvider, MarketDataset};
use crate::error::{Result, ScannerError};
use crate::notify::{format_alert, NotificationSink};
use crate::scanner::batching::chunk_symbols;
use crate::strategy::CrossoverDetector;
use crate::types::{CrossoverDirection, ScanResult};

pub struct CrossoverScanner {
    config: ScanConfig,
    detector: CrossoverDetector,
    provider: Arc<dyn MarketDataProvider>,
    sink: Arc<dyn NotificationSink>,
    symbol_suffix: String,
}

impl CrossoverScanner {
    pub fn new(
        config: ScanConfig,
        provider: Arc<dyn MarketDataProvider>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let detector = CrossoverDetector::new(config.fast_span, config.slow_span)?;

        Ok(Self {
            config,
            detector,
            provider,
            sink,
            symbol_suffix: String::new(),
        })
    }

    /// Suffix stripped from symbols when they are shown in alerts
    pub fn with_symbol_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbol_suffix = suffix.into();
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan with the configured batch size
    pub async fn run(&self, symbols: &[String]) -> ScanResult {
        self.scan(symbols, self.config.batch_size).await
    }

    /// Scan `symbols` in chunks of `batch_size`, then dispatch alerts.
    ///
    /// Never fails: unavailable chunks and bad symbols reduce coverage and
    /// are recorded in the result, notification failures are only logged.
    pub async fn scan(&self, symbols: &[String], batch_size: usize) -> ScanResult {
        let mut result = ScanResult::new(self.config.timeframe);
        let span = info_span!("scan", scan_id = %result.scan_id);

        async {
            info!(
                "--- Running {} scanner at {} ---",
                self.config.timeframe.label(),
                result.started_at.format("%Y-%m-%d %H:%M:%S")
            );

            if symbols.is_empty() {
                info!("No symbols to scan.");
                return result;
            }

            let chunks = chunk_symbols(symbols, batch_size);
            result.chunks_total = chunks.len();

            for (idx, chunk) in chunks.iter().enumerate() {
                info!(
                    "--- Processing batch {}/{} ({} symbols) ---",
                    idx + 1,
                    chunks.len(),
                    chunk.len()
                );

                match self.fetch_chunk(chunk).await {
                    Ok(dataset) => self.classify_chunk(&dataset, chunk, &mut result),
                    Err(e) => {
                        warn!("Failed to download stock data for batch {}: {} ({})", idx + 1, e, e.error_code());
                        result.chunks_failed += 1;
                        result.errors.push(format!("batch {}: {}", idx + 1, e));
                    }
                }
            }

            info!(
                "--- Scan complete: {} evaluated, {} skipped, {}/{} batches failed. Sending alerts... ---",
                result.symbols_evaluated,
                result.symbols_skipped,
                result.chunks_failed,
                result.chunks_total
            );

            self.dispatch_alerts(&result).await;
            result
        }
        .instrument(span)
        .await
    }

    /// Stage 1: one bulk fetch per chunk
    async fn fetch_chunk(&self, chunk: &[String]) -> Result<MarketDataset> {
        let dataset = self
            .provider
            .fetch_bars(chunk, self.config.lookback(), self.config.timeframe)
            .await?;

        let usable = dataset
            .symbols()
            .filter(|symbol| chunk.iter().any(|s| s == symbol))
            .filter(|symbol| dataset.closes(symbol).is_some_and(|c| !c.is_empty()))
            .count();
        if usable == 0 {
            return Err(ScannerError::DataUnavailable(
                "Could not download any stock data for this batch".to_string(),
            ));
        }

        Ok(dataset)
    }

    /// Stage 2: classify every symbol of a fetched chunk
    fn classify_chunk(&self, dataset: &MarketDataset, chunk: &[String], result: &mut ScanResult) {
        for symbol in chunk {
            let series = match dataset.extract(symbol) {
                Ok(series) => series,
                Err(ScannerError::SymbolMissing(_)) => {
                    debug!("{} not in downloaded data", symbol);
                    result.symbols_skipped += 1;
                    continue;
                }
                Err(e) => {
                    if e.is_recoverable() {
                        warn!("Could not process {}: {}", symbol, e);
                    } else {
                        error!("Unexpected error processing {}: {} ({})", symbol, e, e.error_code());
                    }
                    result.symbols_skipped += 1;
                    result.errors.push(format!("{}: {}", symbol, e));
                    continue;
                }
            };

            result.symbols_evaluated += 1;

            if let Some(event) = self.detector.classify(&series) {
                if result.record(symbol, event.direction) {
                    match event.direction {
                        CrossoverDirection::Bullish => info!("  🟢 BULLISH: {}", symbol),
                        CrossoverDirection::Bearish => info!("  🔴 BEARISH: {}", symbol),
                    }
                }
            }
        }
    }

    /// Stage 3: one aggregate message per non-empty direction
    async fn dispatch_alerts(&self, result: &ScanResult) {
        if result.is_empty() {
            info!("No new crossovers found on {} timeframe.", self.config.timeframe.label());
            return;
        }

        for direction in [CrossoverDirection::Bullish, CrossoverDirection::Bearish] {
            let symbols = result.symbols(direction);
            if symbols.is_empty() {
                continue;
            }

            let message = format_alert(direction, self.config.timeframe, symbols, &self.symbol_suffix);
            if let Err(e) = self.sink.notify(&message).await {
                error!("✗ Failed to send {} alert: {} ({})", direction, e, e.error_code());
            }
        }
    }
}
