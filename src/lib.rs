pub mod types;
pub mod error;
pub mod config;
pub mod data;
pub mod strategy;
pub mod notify;
pub mod scanner;
pub mod time;

pub use types::*;
pub use error::{Result, ScannerError};
pub use scanner::CrossoverScanner;
pub use strategy::classify;
