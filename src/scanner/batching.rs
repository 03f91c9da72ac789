//! Symbol universe partitioning

/// Split `symbols` into consecutive chunks of at most `batch_size`.
///
/// A batch size of 0 is treated as 1.
pub fn chunk_symbols(symbols: &[String], batch_size: usize) -> Vec<&[String]> {
    symbols.chunks(batch_size.max(1)).collect()
}

/// Number of chunks `chunk_symbols` will produce
pub fn chunk_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}
