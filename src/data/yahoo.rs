/// Yahoo Finance chart API client
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::data::market_data::{MarketDataProvider, MarketDataset};
use crate::error::{Result, ScannerError};
use crate::types::{Bar, Timeframe};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Market data provider backed by the Yahoo Finance v8 chart endpoint.
///
/// The endpoint serves one symbol per request, so a batch is fetched as a
/// sequence of requests with a short pause between them.
pub struct YahooFinanceClient {
    client: Client,
    base_url: Url,
    request_delay: std::time::Duration,
}

impl YahooFinanceClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_sec))
            .user_agent(USER_AGENT)
            .build()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ScannerError::ConfigError(format!("Invalid market data URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ScannerError::ConfigError(format!(
                "Invalid market data URL '{}'",
                config.base_url
            )));
        }

        Ok(YahooFinanceClient {
            client,
            base_url,
            request_delay: std::time::Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Get historical candle data for one symbol
    pub async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from_date: DateTime<Utc>,
        to_date: DateTime<Utc>,
    ) -> Result<Vec<Bar>> {
        let url = self.chart_url(symbol)?;
        debug!("Fetching candles: {} {} {} -> {}", symbol, timeframe.as_str(), from_date, to_date);

        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", from_date.timestamp().to_string()),
                ("period2", to_date.timestamp().to_string()),
                ("interval", timeframe.as_str().to_string()),
                ("includePrePost", "false".to_string()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        let bars = parse_chart(symbol, &body).map_err(|e| match e {
            ScannerError::DeserializationError(_) if !status.is_success() => {
                ScannerError::DataUnavailable(format!("{}: HTTP {}", symbol, status))
            }
            other => other,
        })?;

        debug!("Fetched {} candles for {}", bars.len(), symbol);
        Ok(bars)
    }

    /// Chart endpoint for `symbol`, escaped as a single path segment
    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ScannerError::ConfigError(format!("Invalid market data URL '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn fetch_bars(
        &self,
        symbols: &[String],
        lookback: Duration,
        timeframe: Timeframe,
    ) -> Result<MarketDataset> {
        let to_date = Utc::now();
        let from_date = to_date - lookback;
        let mut dataset = MarketDataset::new();
        let mut failed = 0usize;

        for (idx, symbol) in symbols.iter().enumerate() {
            if idx > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match self.get_candles(symbol, timeframe, from_date, to_date).await {
                Ok(bars) if !bars.is_empty() => dataset.insert(symbol.clone(), bars),
                Ok(_) => {
                    debug!("{}: empty chart, omitting", symbol);
                    failed += 1;
                }
                Err(e) => {
                    warn!("⚠️  Failed to get bars for {}: {} ({})", symbol, e, e.error_code());
                    failed += 1;
                }
            }
        }

        if dataset.is_empty() {
            return Err(ScannerError::DataUnavailable(format!(
                "no data returned for any of {} symbols",
                symbols.len()
            )));
        }

        if failed > 0 {
            info!("Downloaded {}/{} symbols ({} omitted)", dataset.len(), symbols.len(), failed);
        }

        Ok(dataset)
    }
}

/// Parse a chart payload: parallel timestamp/quote arrays, nulls for gaps
pub(crate) fn parse_chart(symbol: &str, body: &str) -> Result<Vec<Bar>> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(ScannerError::DataUnavailable(format!(
            "{}: {} {}",
            symbol,
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ScannerError::DataUnavailable(format!("{}: empty chart result", symbol)))?;

    // a symbol with no trades in the window comes back without timestamps
    let Some(timestamps) = result.timestamp else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    if quote.close.len() != timestamps.len() {
        return Err(ScannerError::InvalidBarData(format!(
            "{}: {} timestamps but {} closes",
            symbol,
            timestamps.len(),
            quote.close.len()
        )));
    }

    let value = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten().unwrap_or(f64::NAN);

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
            Some(Bar {
                timestamp,
                open: value(&quote.open, i),
                high: value(&quote.high, i),
                low: value(&quote.low, i),
                close: value(&quote.close, i),
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0) as u64,
            })
        })
        .collect();

    Ok(bars)
}
