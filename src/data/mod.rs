pub mod market_data;
pub mod symbols;
pub mod yahoo;

pub use market_data::{MarketDataProvider, MarketDataset};
pub use symbols::{display_symbol, normalize_symbol, FileSymbolSource, SymbolSource};
pub use yahoo::YahooFinanceClient;
