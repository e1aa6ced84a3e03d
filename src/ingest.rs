//! Bytes to [`ResultDocument`]: decode, validate, then materialize the
//! bindings in bounded chunks so the frame loop gets control back between
//! batches.

use std::io::Read;

use flate2::read::GzDecoder;
use log::{debug, trace};
use serde_json::Value;

use crate::error::{IngestError, Result};
use crate::model::{Head, ResultDocument, Results, Row};

/// Rows moved per chunk for file and default-resource ingestion.
pub const DEFAULT_CHUNK_SIZE: usize = 5000;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Runs the whole pipeline synchronously, reporting progress after every
/// chunk. A document that fits in one chunk reports 100 exactly once.
pub fn ingest(
    bytes: &[u8],
    chunk_size: usize,
    mut on_progress: impl FnMut(u8),
) -> Result<ResultDocument> {
    let document = decode(bytes)?;
    let mut chunks = ChunkedIngest::new(document, chunk_size);
    while let Some(progress) = chunks.step() {
        on_progress(progress);
    }
    chunks
        .into_document()
        .ok_or_else(|| IngestError::Parse("chunk processing stopped early".to_string()))
}

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Parses raw bytes as a SPARQL JSON results document.
///
/// Bytes are taken as UTF-8 JSON text whatever the file was called. If they
/// carry the gzip magic number they are inflated first.
pub fn decode(bytes: &[u8]) -> Result<ResultDocument> {
    let inflated;
    let raw = if is_gzip(bytes) {
        inflated = gunzip(bytes)?;
        debug!("Inflated gzip payload: {} -> {} bytes", bytes.len(), inflated.len());
        &inflated[..]
    } else {
        bytes
    };

    let text = std::str::from_utf8(raw).map_err(|e| IngestError::Parse(e.to_string()))?;
    let value: Value = serde_json::from_str(text).map_err(|e| IngestError::Parse(e.to_string()))?;

    if value.pointer("/head/vars").is_none() || value.pointer("/results/bindings").is_none() {
        return Err(IngestError::schema());
    }

    let document: ResultDocument =
        serde_json::from_value(value).map_err(|e| IngestError::Schema {
            detail: Some(e.to_string()),
        })?;
    trace!(
        "Decoded document: {} vars, {} bindings",
        document.head.vars.len(),
        document.row_count()
    );
    Ok(document)
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len() * 4);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| IngestError::Parse(format!("gzip decompression failed: {}", e)))?;
    Ok(out)
}

fn progress_percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round().min(100.0) as u8
}

/// Resumable chunk loop. Each [`step`](Self::step) moves at most one chunk of
/// bindings into the output and returns the progress percentage; `None` once
/// all rows have been moved. Iterating it yields the same percentages.
pub struct ChunkedIngest {
    head: Head,
    distinct: bool,
    ordered: bool,
    pending: std::vec::IntoIter<Row>,
    output: Vec<Row>,
    total: usize,
    chunk_size: usize,
    finished: bool,
}

impl ChunkedIngest {
    pub fn new(document: ResultDocument, chunk_size: usize) -> Self {
        let ResultDocument { head, results } = document;
        let total = results.bindings.len();
        Self {
            head,
            distinct: results.distinct,
            ordered: results.ordered,
            pending: results.bindings.into_iter(),
            output: Vec::with_capacity(total),
            total,
            chunk_size: chunk_size.max(1),
            finished: false,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.output.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn step(&mut self) -> Option<u8> {
        if self.finished {
            return None;
        }

        if self.total <= self.chunk_size {
            self.output.extend(self.pending.by_ref());
            self.finished = true;
            return Some(100);
        }

        self.output
            .extend(self.pending.by_ref().take(self.chunk_size));
        let processed = self.output.len();
        if processed >= self.total {
            self.finished = true;
        }
        let progress = progress_percent(processed, self.total);
        trace!("Chunk done: {}/{} rows ({}%)", processed, self.total, progress);
        Some(progress)
    }

    /// The materialized document, or `None` while rows are still pending.
    pub fn into_document(self) -> Option<ResultDocument> {
        if !self.finished {
            return None;
        }
        Some(ResultDocument {
            head: self.head,
            results: Results {
                distinct: self.distinct,
                ordered: self.ordered,
                bindings: self.output,
            },
        })
    }
}

impl Iterator for ChunkedIngest {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.step()
    }
}
