pub mod batching;
pub mod orchestrator;

pub use batching::{chunk_count, chunk_symbols};
pub use orchestrator::CrossoverScanner;
