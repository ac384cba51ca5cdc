// Chunked concurrent bulk writer
//
// Every non-empty table is split into chunks and each chunk is written by its
// own task against the shared store. All chunks run to completion; failures are
// collected after the join and returned together.

use std::ops::Range;
use std::sync::Arc;

use futures::future::join_all;
use otlp2columnar_core::{Row, Table, TableMap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chunk::{chunk_ranges, DEFAULT_CHUNK_SIZE};
use crate::error::{ChunkFailure, Result, WriterError};
use crate::store::TableStore;

/// Writer settings.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// Namespace prepended to every table name; empty means none.
    pub schema: String,
    pub chunk_size: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            schema: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Writes aggregated table maps to a [`TableStore`] in bounded chunks.
#[derive(Clone)]
pub struct ChunkedBulkWriter {
    store: Arc<dyn TableStore>,
    options: WriterOptions,
}

struct ChunkJob {
    table: Arc<str>,
    rows: Arc<[Row]>,
    range: Range<usize>,
    index: usize,
    chunks: usize,
}

impl ChunkJob {
    fn failure(&self, error: WriterError) -> ChunkFailure {
        ChunkFailure {
            table: self.table.to_string(),
            chunk: self.index,
            chunks: self.chunks,
            rows: self.range.len(),
            error,
        }
    }
}

impl ChunkedBulkWriter {
    pub fn new(store: Arc<dyn TableStore>, options: WriterOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    /// Table name as sent to the store, with the schema prefix when configured.
    pub fn qualified_table(&self, table: Table) -> String {
        if self.options.schema.is_empty() {
            table.as_str().to_string()
        } else {
            format!("{}.{}", self.options.schema, table.as_str())
        }
    }

    /// Write the rows of a single table.
    pub async fn write(&self, table: Table, rows: Vec<Row>) -> Result<()> {
        self.write_tables(std::iter::once((table, rows))).await
    }

    /// Write every non-empty table of a batch.
    #[tracing::instrument(skip_all, fields(tables = tables.len()))]
    pub async fn write_all(&self, tables: TableMap) -> Result<()> {
        self.write_tables(tables).await
    }

    async fn write_tables(&self, tables: impl IntoIterator<Item = (Table, Vec<Row>)>) -> Result<()> {
        let jobs = self.plan(tables);
        if jobs.is_empty() {
            return Ok(());
        }

        let attempted = jobs.len();
        let total_rows: usize = jobs.iter().map(|job| job.range.len()).sum();
        let (failure_tx, mut failure_rx) = mpsc::channel::<ChunkFailure>(attempted);

        let mut pending = Vec::with_capacity(attempted);
        let mut handles = Vec::with_capacity(attempted);
        for job in jobs {
            let store = Arc::clone(&self.store);
            let failure_tx = failure_tx.clone();
            let table = Arc::clone(&job.table);
            let rows = Arc::clone(&job.rows);
            let range = job.range.clone();
            let index = job.index;
            let chunks = job.chunks;

            handles.push(tokio::spawn(async move {
                let chunk = &rows[range];
                debug!(table = %table, chunk = index, rows = chunk.len(), "Writing chunk");
                if let Err(error) = store.insert_records(&table, chunk).await {
                    let failure = ChunkFailure {
                        table: table.to_string(),
                        chunk: index,
                        chunks,
                        rows: chunk.len(),
                        error,
                    };
                    // capacity equals the number of chunks, so this never waits
                    let _ = failure_tx.send(failure).await;
                }
            }));
            pending.push(job);
        }
        drop(failure_tx);

        let mut failures = Vec::new();
        for (job, joined) in pending.iter().zip(join_all(handles).await) {
            if let Err(join_err) = joined {
                failures.push(job.failure(WriterError::write_failure(
                    job.table.to_string(),
                    format!("chunk task did not complete: {join_err}"),
                )));
            }
        }
        while let Some(failure) = failure_rx.recv().await {
            failures.push(failure);
        }

        if failures.is_empty() {
            info!(chunks = attempted, rows = total_rows, "Wrote all chunks");
            return Ok(());
        }

        failures.sort_by(|a, b| a.table.cmp(&b.table).then(a.chunk.cmp(&b.chunk)));
        warn!(
            failed = failures.len(),
            chunks = attempted,
            rows = total_rows,
            "Chunk writes failed"
        );
        Err(WriterError::Aggregate {
            attempted,
            failures,
        })
    }

    fn plan(&self, tables: impl IntoIterator<Item = (Table, Vec<Row>)>) -> Vec<ChunkJob> {
        let mut jobs = Vec::new();
        for (table, rows) in tables {
            if rows.is_empty() {
                continue;
            }

            let qualified: Arc<str> = Arc::from(self.qualified_table(table));
            let rows: Arc<[Row]> = Arc::from(rows);
            let ranges: Vec<_> = chunk_ranges(rows.len(), self.options.chunk_size).collect();
            let chunks = ranges.len();
            for (index, range) in ranges.into_iter().enumerate() {
                jobs.push(ChunkJob {
                    table: Arc::clone(&qualified),
                    rows: Arc::clone(&rows),
                    range,
                    index,
                    chunks,
                });
            }
        }
        jobs
    }
}
