//! Technical indicators implementation

/// Smoothing factor for an EMA of the given span
pub fn ema_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Calculate the full EMA series over `values`.
///
/// Seeded with the first value and smoothed recursively without bias
/// correction, so `ema[i]` only depends on `values[..=i]`. The output is
/// always the same length as the input. A NaN input poisons every value
/// after it.
pub fn ema_series(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = ema_alpha(span);
    let mut series = Vec::with_capacity(values.len());

    let mut iter = values.iter();
    let Some(&seed) = iter.next() else {
        return series;
    };
    series.push(seed);

    let mut ema = seed;
    for &value in iter {
        // same as value * alpha + ema * (1 - alpha), but exact for flat input
        ema += alpha * (value - ema);
        series.push(ema);
    }

    series
}

/// Last two values of a series as (previous, current)
pub fn last_two(series: &[f64]) -> Option<(f64, f64)> {
    match series {
        [.., prev, curr] => Some((*prev, *curr)),
        _ => None,
    }
}
