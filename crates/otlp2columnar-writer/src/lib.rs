//! Chunked bulk writer for flattened OTLP rows
//!
//! Splits each destination table into bounded chunks and inserts them
//! concurrently through a [`TableStore`]. A failing chunk never stops its
//! siblings; all failures come back in one [`WriterError::Aggregate`].

// Chunk failures carry a full WriterError each; keeping them unboxed keeps
// matching on the aggregate simple.
#![allow(clippy::result_large_err)]

mod chunk;
mod error;
mod store;
mod writer;

pub use chunk::{chunk_ranges, chunk_rows, DEFAULT_CHUNK_SIZE};
pub use error::{ChunkFailure, ErrorCode, Result, WriterError};
pub use store::{HttpStoreConfig, HttpTableStore, TableStore};
pub use writer::{ChunkedBulkWriter, WriterOptions};

// Re-export commonly used types for convenience
pub use otlp2columnar_core;
