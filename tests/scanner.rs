//! End-to-end scan behaviour against in-memory collaborators
mod common;

use std::sync::Arc;

use common::{bearish_bars, bullish_bars, flat_bars, symbols, MockProvider, RecordingSink};
use emascan::config::ScanConfig;
use emascan::{CrossoverScanner, Timeframe};

fn scanner(provider: Arc<MockProvider>, sink: Arc<RecordingSink>) -> CrossoverScanner {
    CrossoverScanner::new(ScanConfig::default(), provider, sink).expect("valid config")
}

#[tokio::test]
async fn bullish_and_bearish_across_chunks() {
    let provider = Arc::new(
        MockProvider::new()
            .with_bars("A", bullish_bars())
            .with_bars("B", flat_bars(30))
            .with_bars("C", bearish_bars()),
    );
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider.clone(), sink.clone())
        .scan(&symbols(&["A", "B", "C"]), 2)
        .await;

    assert_eq!(result.bullish, vec!["A"]);
    assert_eq!(result.bearish, vec!["C"]);
    assert_eq!(result.chunks_total, 2);
    assert_eq!(result.symbols_evaluated, 3);
    assert_eq!(provider.calls(), vec![symbols(&["A", "B"]), symbols(&["C"])]);

    let messages = sink.messages();
    assert_eq!(messages.len(), 2);
    for message in &messages {
        // header + exactly one symbol line
        assert_eq!(message.lines().count(), 2);
    }
    assert_eq!(messages[0], "📈 1-Hour Bullish EMA Crossover:\n• A");
    assert_eq!(messages[1], "📉 1-Hour Bearish EMA Crossover:\n• C");
}

#[tokio::test]
async fn short_histories_produce_no_alerts() {
    let provider = Arc::new(
        MockProvider::new()
            .with_bars("A", flat_bars(21))
            .with_bars("B", flat_bars(5))
            .with_bars("C", flat_bars(1)),
    );
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider, sink.clone())
        .scan(&symbols(&["A", "B", "C"]), 50)
        .await;

    assert!(result.bullish.is_empty());
    assert!(result.bearish.is_empty());
    assert!(result.errors.is_empty());
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn failed_chunk_does_not_stop_the_scan() {
    let provider = Arc::new(
        MockProvider::new()
            .with_bars("A", bullish_bars())
            .with_bars("B", bullish_bars())
            .with_bars("C", bearish_bars())
            .with_bars("D", bullish_bars())
            .failing_on("A"),
    );
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider.clone(), sink.clone())
        .scan(&symbols(&["A", "B", "C", "D"]), 2)
        .await;

    // first chunk [A, B] is lost, second chunk [C, D] still classified
    assert_eq!(result.chunks_failed, 1);
    assert_eq!(result.bullish, vec!["D"]);
    assert_eq!(result.bearish, vec!["C"]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(provider.calls().len(), 2);
    assert_eq!(sink.messages().len(), 2);
}

#[tokio::test]
async fn every_chunk_failing_still_completes() {
    let provider = Arc::new(MockProvider::new().failing_on("A").failing_on("C"));
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider.clone(), sink.clone())
        .scan(&symbols(&["A", "B", "C"]), 2)
        .await;

    assert_eq!(result.chunks_total, 2);
    assert_eq!(result.chunks_failed, 2);
    assert!(result.is_empty());
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn chunk_without_usable_data_counts_as_failed() {
    let provider = Arc::new(
        MockProvider::new()
            .with_bars("A", Vec::new())
            .with_bars("C", bearish_bars())
            .with_stray_bars("ZZZ", bullish_bars()),
    );
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider, sink.clone())
        .scan(&symbols(&["A", "B", "C"]), 2)
        .await;

    // [A, B] only brought back an empty list and an unrequested symbol
    assert_eq!(result.chunks_failed, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("batch 1:"));
    assert_eq!(result.symbols_evaluated, 1);
    assert_eq!(result.bearish, vec!["C"]);
    assert!(result.bullish.is_empty());
    assert_eq!(sink.messages().len(), 1);
}

#[tokio::test]
async fn trailing_blank_bar_suppresses_alert() {
    let mut bars = bullish_bars();
    let mut blank = bars[bars.len() - 1].clone();
    blank.timestamp += chrono::Duration::hours(1);
    blank.open = f64::NAN;
    blank.close = f64::NAN;
    bars.push(blank);

    let provider = Arc::new(MockProvider::new().with_bars("A", bars));
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider, sink.clone()).scan(&symbols(&["A"]), 50).await;

    assert_eq!(result.symbols_evaluated, 1);
    assert!(result.is_empty());
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn missing_symbols_are_skipped_quietly() {
    let provider = Arc::new(
        MockProvider::new()
            .with_bars("A", bullish_bars())
            .with_bars("C", bullish_bars()),
    );
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider, sink.clone())
        .scan(&symbols(&["A", "B", "C"]), 50)
        .await;

    assert_eq!(result.bullish, vec!["A", "C"]);
    assert_eq!(result.symbols_skipped, 1);
    // absent symbols are not errors
    assert!(result.errors.is_empty());

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], "📈 1-Hour Bullish EMA Crossover:\n• A\n• C");
}

#[tokio::test]
async fn malformed_symbol_is_skipped_and_recorded() {
    let mut broken = bullish_bars();
    for bar in &mut broken {
        bar.close = f64::NAN;
    }
    let provider = Arc::new(
        MockProvider::new()
            .with_bars("A", broken)
            .with_bars("B", bearish_bars()),
    );
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider, sink)
        .scan(&symbols(&["A", "B"]), 50)
        .await;

    assert_eq!(result.bearish, vec!["B"]);
    assert_eq!(result.symbols_skipped, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("A:"));
}

#[tokio::test]
async fn notification_failure_keeps_result() {
    let build = || {
        Arc::new(
            MockProvider::new()
                .with_bars("A", bullish_bars())
                .with_bars("B", bearish_bars()),
        )
    };

    let ok_sink = Arc::new(RecordingSink::new());
    let expected = scanner(build(), ok_sink).scan(&symbols(&["A", "B"]), 50).await;

    let failing_sink = Arc::new(RecordingSink::failing());
    let result = scanner(build(), failing_sink.clone())
        .scan(&symbols(&["A", "B"]), 50)
        .await;

    assert_eq!(result.bullish, expected.bullish);
    assert_eq!(result.bearish, expected.bearish);
    // both directions were still attempted
    assert_eq!(failing_sink.messages().len(), 2);
}

#[tokio::test]
async fn duplicate_symbols_are_reported_once() {
    let provider = Arc::new(MockProvider::new().with_bars("A", bullish_bars()));
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider, sink.clone())
        .scan(&symbols(&["A", "A"]), 1)
        .await;

    assert_eq!(result.bullish, vec!["A"]);
    assert_eq!(sink.messages(), vec!["📈 1-Hour Bullish EMA Crossover:\n• A".to_string()]);
}

#[tokio::test]
async fn run_uses_configured_batch_size_and_suffix() {
    let provider = Arc::new(
        MockProvider::new()
            .with_bars("RELIANCE.NS", bullish_bars())
            .with_bars("TCS.NS", flat_bars(40))
            .with_bars("INFY.NS", flat_bars(40)),
    );
    let sink = Arc::new(RecordingSink::new());
    let config = ScanConfig {
        batch_size: 1,
        timeframe: Timeframe::Daily,
        ..ScanConfig::default()
    };

    let scanner = CrossoverScanner::new(config, provider.clone(), sink.clone())
        .unwrap()
        .with_symbol_suffix(".NS");
    let result = scanner.run(&symbols(&["RELIANCE.NS", "TCS.NS", "INFY.NS"])).await;

    assert_eq!(result.timeframe, Timeframe::Daily);
    assert_eq!(provider.calls().len(), 3);
    assert_eq!(sink.messages(), vec!["📈 Daily Bullish EMA Crossover:\n• RELIANCE".to_string()]);
}

#[tokio::test]
async fn empty_universe_makes_no_calls() {
    let provider = Arc::new(MockProvider::new());
    let sink = Arc::new(RecordingSink::new());

    let result = scanner(provider.clone(), sink.clone()).scan(&[], 50).await;

    assert!(result.is_empty());
    assert_eq!(result.chunks_total, 0);
    assert!(provider.calls().is_empty());
    assert!(sink.messages().is_empty());
}

#[test]
fn invalid_spans_are_rejected() {
    let config = ScanConfig {
        fast_span: 21,
        slow_span: 9,
        ..ScanConfig::default()
    };
    let provider = Arc::new(MockProvider::new());
    let sink = Arc::new(RecordingSink::new());
    assert!(CrossoverScanner::new(config, provider, sink).is_err());
}
