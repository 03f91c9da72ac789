/// Symbol universe loading
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, ScannerError};

/// Source of the ordered symbol universe to scan
pub trait SymbolSource: Send + Sync {
    fn load_symbols(&self) -> Result<Vec<String>>;
}

/// Comma-separated symbol file (any number of lines), e.g. `RELIANCE, TCS, INFY`
pub struct FileSymbolSource {
    path: PathBuf,
    suffix: String,
}

impl FileSymbolSource {
    pub fn new<P: AsRef<Path>>(path: P, suffix: impl Into<String>) -> Self {
        FileSymbolSource {
            path: path.as_ref().to_path_buf(),
            suffix: suffix.into(),
        }
    }

    /// Parse symbols from any reader, normalising each entry
    pub fn parse<R: std::io::Read>(reader: R, suffix: &str) -> Result<Vec<String>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut seen = HashSet::new();
        let mut symbols = Vec::new();

        for record in rdr.records() {
            let record = record?;
            for field in record.iter() {
                let Some(symbol) = normalize_symbol(field, suffix) else {
                    continue;
                };
                if seen.insert(symbol.clone()) {
                    symbols.push(symbol);
                } else {
                    debug!("Duplicate symbol {} ignored", symbol);
                }
            }
        }

        Ok(symbols)
    }
}

impl SymbolSource for FileSymbolSource {
    fn load_symbols(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Err(ScannerError::FileNotFound(format!(
                "Stock list file '{}' not found",
                self.path.display()
            )));
        }

        let file = std::fs::File::open(&self.path)?;
        let symbols = Self::parse(file, &self.suffix)?;
        info!("Loaded {} symbols from {}", symbols.len(), self.path.display());
        Ok(symbols)
    }
}

/// Trim a raw entry and append the provider suffix; `None` for blanks
pub fn normalize_symbol(raw: &str, suffix: &str) -> Option<String> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return None;
    }
    if suffix.is_empty() || symbol.ends_with(suffix) {
        return Some(symbol.to_string());
    }
    Some(format!("{}{}", symbol, suffix))
}

/// Symbol as shown to humans, without the provider suffix
pub fn display_symbol<'a>(symbol: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return symbol;
    }
    symbol.strip_suffix(suffix).unwrap_or(symbol)
}
