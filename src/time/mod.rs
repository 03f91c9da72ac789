pub mod session;

pub use session::{is_market_open, is_trading_day, market_timings, next_market_open};
