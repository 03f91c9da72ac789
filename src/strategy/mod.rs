pub mod indicators;
pub mod ema_crossover;

pub use indicators::{ema_alpha, ema_series};
pub use ema_crossover::{classify, detect_crossover, CrossoverDetector, DEFAULT_FAST_SPAN, DEFAULT_SLOW_SPAN};
