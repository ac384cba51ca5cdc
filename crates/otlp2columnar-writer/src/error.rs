//! Error types for the bulk writer crate

use std::fmt;

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: Store unreachable or connection failed
    E001StoreUnreachable,
    /// E002: Store rejected the configured credentials
    E002InvalidCredentials,
    /// E003: Configuration missing or invalid
    E003InvalidConfig,
    /// E004: Store rejected or failed an insert
    E004WriteFailure,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001StoreUnreachable => "E001",
            Self::E002InvalidCredentials => "E002",
            Self::E003InvalidConfig => "E003",
            Self::E004WriteFailure => "E004",
        }
    }
}

/// One chunk write that did not succeed.
#[derive(Debug)]
pub struct ChunkFailure {
    /// Fully qualified table name the chunk was sent to.
    pub table: String,
    /// Zero-based chunk index within the table.
    pub chunk: usize,
    /// Number of chunks the table was split into.
    pub chunks: usize,
    /// Rows carried by the failed chunk.
    pub rows: usize,
    pub error: WriterError,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} chunk {}/{} ({} rows): {}",
            self.table,
            self.chunk + 1,
            self.chunks,
            self.rows,
            self.error
        )
    }
}

/// Errors that can occur while writing rows to the store
#[derive(Debug, Error)]
pub enum WriterError {
    /// Store could not be reached
    #[error("[{code}] Store unreachable at '{endpoint}': {reason}")]
    StoreUnreachable {
        code: &'static str,
        endpoint: String,
        reason: String,
    },

    /// Store refused the credentials
    #[error("[{code}] Store at '{endpoint}' rejected credentials (HTTP {status})")]
    InvalidCredentials {
        code: &'static str,
        endpoint: String,
        status: u16,
    },

    /// Invalid configuration provided
    #[error("[{code}] Invalid configuration: {message}")]
    InvalidConfig { code: &'static str, message: String },

    /// Insert into one table failed
    #[error("[{code}] Write to '{table}' failed: {message}")]
    WriteFailure {
        code: &'static str,
        table: String,
        message: String,
    },

    /// Every chunk was attempted and at least one failed
    #[error("{} of {attempted} chunk writes failed: {}", failures.len(), join_failures(failures))]
    Aggregate {
        attempted: usize,
        failures: Vec<ChunkFailure>,
    },
}

fn join_failures(failures: &[ChunkFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl WriterError {
    /// Create a store unreachable error with error code
    pub fn store_unreachable(endpoint: String, reason: String) -> Self {
        Self::StoreUnreachable {
            code: ErrorCode::E001StoreUnreachable.as_str(),
            endpoint,
            reason,
        }
    }

    /// Create an invalid credentials error with error code
    pub fn invalid_credentials(endpoint: String, status: u16) -> Self {
        Self::InvalidCredentials {
            code: ErrorCode::E002InvalidCredentials.as_str(),
            endpoint,
            status,
        }
    }

    /// Create an invalid config error with error code
    pub fn invalid_config(message: String) -> Self {
        Self::InvalidConfig {
            code: ErrorCode::E003InvalidConfig.as_str(),
            message,
        }
    }

    /// Create a write failure error with error code
    pub fn write_failure(table: String, message: String) -> Self {
        Self::WriteFailure {
            code: ErrorCode::E004WriteFailure.as_str(),
            table,
            message,
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::StoreUnreachable { code, .. }
            | Self::InvalidCredentials { code, .. }
            | Self::InvalidConfig { code, .. }
            | Self::WriteFailure { code, .. } => Some(*code),
            Self::Aggregate { .. } => None,
        }
    }

    /// Individual chunk failures; empty for non-aggregate errors.
    pub fn chunk_failures(&self) -> &[ChunkFailure] {
        match self {
            Self::Aggregate { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Result type for writer operations
pub type Result<T> = std::result::Result<T, WriterError>;
