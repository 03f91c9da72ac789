/// Centralized error types for the scanner
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    // Data Errors
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Symbol missing from dataset: {0}")]
    SymbolMissing(String),

    #[error("Invalid bar data: {0}")]
    InvalidBarData(String),

    #[error("Deserialization failed: {0}")]
    DeserializationError(#[from] serde_json::Error),

    // Network Errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // Notification Errors
    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    // Symbol Source Errors
    #[error("Symbol list is empty: {0}")]
    EmptySymbolList(String),

    #[error("CSV parsing failed: {0}")]
    CsvError(#[from] csv::Error),

    // File I/O Errors
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, ScannerError>;

impl ScannerError {
    /// Errors a scan recovers from locally (skip chunk / skip symbol / log)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScannerError::DataUnavailable(_)
                | ScannerError::SymbolMissing(_)
                | ScannerError::InvalidBarData(_)
                | ScannerError::DeserializationError(_)
                | ScannerError::HttpError(_)
                | ScannerError::NotificationFailed(_)
        )
    }

    /// Errors the driver must report at startup instead of scanning
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            ScannerError::ConfigError(_)
                | ScannerError::InvalidParameter(_)
                | ScannerError::MissingCredentials(_)
                | ScannerError::EmptySymbolList(_)
                | ScannerError::FileNotFound(_)
        )
    }

    /// Get error code for logging/monitoring
    pub fn error_code(&self) -> &str {
        match self {
            ScannerError::DataUnavailable(_) => "DATA_001",
            ScannerError::SymbolMissing(_) => "DATA_002",
            ScannerError::InvalidBarData(_) => "DATA_003",
            ScannerError::DeserializationError(_) => "DATA_004",
            ScannerError::HttpError(_) => "NET_001",
            ScannerError::NotificationFailed(_) => "NOTIFY_001",
            ScannerError::ConfigError(_) => "CFG_001",
            ScannerError::InvalidParameter(_) => "CFG_002",
            ScannerError::MissingCredentials(_) => "CFG_003",
            ScannerError::EmptySymbolList(_) => "SYM_001",
            ScannerError::CsvError(_) => "SYM_002",
            ScannerError::FileError(_) => "FILE_001",
            ScannerError::FileNotFound(_) => "FILE_002",
        }
    }
}
