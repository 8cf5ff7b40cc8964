// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log Pipeline (spec §4.5, component C5).
//!
//! Durable store layout under `logs/{run_id}/` (spec §4.5):
//! - `{stream}.jsonl` — append-growing ND-JSON while the run is live.
//! - `chunks/{stream}/{offset:012d}.chunk` — intermediate fragments.
//! - `{stream}.log.gz` — finalized compressed blob.
//!
//! Ordering (spec §9 "Log pipeline ordering"): exactly one
//! `tokio::sync::Mutex` per `(run_id, stream)` key, never sharded.
//! Parallelism is across keys only.

use crate::error::StorageError;
use crate::object_store::ObjectStore;
use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::Mutex as SyncMutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::io::Write as _;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
    System,
}

grid_core::simple_display! {
    LogStream {
        Stdout => "stdout",
        Stderr => "stderr",
        System => "system",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub level: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

type Key = (String, LogStream);

/// Observer of durable log appends, echoed to C6 (spec §4.5 "Each durable
/// append is echoed to C6 for any currently-connected subscriber").
pub trait LogSink: Send + Sync {
    fn on_append(&self, run_id: &str, stream: LogStream, record: &LogRecord);
}

struct StreamBuffer {
    pending: Vec<LogRecord>,
    recent: VecDeque<LogRecord>,
    next_sequence: u64,
    dropped: u64,
}

impl StreamBuffer {
    fn new() -> Self {
        Self { pending: Vec::new(), recent: VecDeque::new(), next_sequence: 1, dropped: 0 }
    }
}

pub struct LogPipelineConfig {
    pub batch_size: usize,
    pub max_cache_lines: usize,
}

impl Default for LogPipelineConfig {
    fn default() -> Self {
        Self { batch_size: 100, max_cache_lines: 1000 }
    }
}

/// Coordinates durable log ingestion, buffering, and fan-out (spec §4.5).
pub struct LogPipeline {
    store: Arc<dyn ObjectStore>,
    config: LogPipelineConfig,
    buffers: SyncMutex<HashMap<Key, Arc<AsyncMutex<StreamBuffer>>>>,
    chunks: SyncMutex<HashMap<Key, Arc<AsyncMutex<ChunkState>>>>,
    sinks: SyncMutex<Vec<Arc<dyn LogSink>>>,
}

#[derive(Default)]
struct ChunkState {
    fragments: Vec<(u64, Vec<u8>)>,
}

impl LogPipeline {
    pub fn new(store: Arc<dyn ObjectStore>, config: LogPipelineConfig) -> Self {
        Self {
            store,
            config,
            buffers: SyncMutex::new(HashMap::new()),
            chunks: SyncMutex::new(HashMap::new()),
            sinks: SyncMutex::new(Vec::new()),
        }
    }

    pub fn add_sink(&self, sink: Arc<dyn LogSink>) {
        self.sinks.lock().push(sink);
    }

    fn buffer_for(&self, run_id: &str, stream: LogStream) -> Arc<AsyncMutex<StreamBuffer>> {
        let key = (run_id.to_string(), stream);
        self.buffers
            .lock()
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(StreamBuffer::new())))
            .clone()
    }

    fn chunk_state_for(&self, run_id: &str, stream: LogStream) -> Arc<AsyncMutex<ChunkState>> {
        let key = (run_id.to_string(), stream);
        self.chunks
            .lock()
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(ChunkState::default())))
            .clone()
    }

    fn notify(&self, run_id: &str, stream: LogStream, record: &LogRecord) {
        for sink in self.sinks.lock().iter() {
            sink.on_append(run_id, stream, record);
        }
    }

    fn jsonl_key(run_id: &str, stream: LogStream) -> String {
        format!("logs/{run_id}/{stream}.jsonl")
    }

    fn gz_key(run_id: &str, stream: LogStream) -> String {
        format!("logs/{run_id}/{stream}.log.gz")
    }

    fn chunk_key(run_id: &str, stream: LogStream, offset: u64) -> String {
        format!("logs/{run_id}/chunks/{stream}/{offset:012}.chunk")
    }

    /// Submit a single log record. Assigns a fresh sequence if `record.sequence`
    /// is zero; otherwise the Worker-assigned sequence is trusted.
    pub async fn submit_line(
        &self,
        run_id: &str,
        stream: LogStream,
        mut record: LogRecord,
    ) -> Result<(), StorageError> {
        let buf = self.buffer_for(run_id, stream);
        let mut guard = buf.lock().await;
        if record.sequence == 0 {
            record.sequence = guard.next_sequence;
        }
        guard.next_sequence = guard.next_sequence.max(record.sequence + 1);
        guard.pending.push(record.clone());
        if guard.recent.len() >= self.config.max_cache_lines {
            guard.recent.pop_front();
        }
        guard.recent.push_back(record.clone());
        let should_flush = guard.pending.len() >= self.config.batch_size;
        drop(guard);
        self.notify(run_id, stream, &record);
        if should_flush {
            self.flush(run_id, stream).await?;
        }
        Ok(())
    }

    pub async fn submit_batch(
        &self,
        run_id: &str,
        stream: LogStream,
        records: Vec<LogRecord>,
    ) -> Result<(), StorageError> {
        for record in records {
            self.submit_line(run_id, stream, record).await?;
        }
        Ok(())
    }

    /// Appends buffered records to the live ND-JSON object. Drops the
    /// oldest buffered record and increments a counter if the appended
    /// batch would exceed `batch_size` (spec §4.5 "buffer overruns").
    pub async fn flush(&self, run_id: &str, stream: LogStream) -> Result<(), StorageError> {
        let buf = self.buffer_for(run_id, stream);
        let mut guard = buf.lock().await;
        if guard.pending.is_empty() {
            return Ok(());
        }
        while guard.pending.len() > self.config.batch_size {
            guard.pending.remove(0);
            guard.dropped += 1;
        }
        let mut body = String::new();
        for record in &guard.pending {
            body.push_str(&serde_json::to_string(record).map_err(|e| StorageError::Internal(e.to_string()))?);
            body.push('\n');
        }
        guard.pending.clear();
        drop(guard);

        let key = Self::jsonl_key(run_id, stream);
        let mut existing = match self.store.get(&key).await {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        existing.extend_from_slice(body.as_bytes());
        self.store.put(&key, existing).await
    }

    pub async fn submit_chunk(
        &self,
        run_id: &str,
        stream: LogStream,
        data: Vec<u8>,
        offset: u64,
        is_final: bool,
        total_size: Option<u64>,
        checksum: Option<String>,
    ) -> Result<(), StorageError> {
        self.store.put(&Self::chunk_key(run_id, stream, offset), data.clone()).await?;
        let state = self.chunk_state_for(run_id, stream);
        state.lock().await.fragments.push((offset, data));
        if is_final {
            let (total_size, checksum) = match (total_size, checksum) {
                (Some(t), Some(c)) => (t, c),
                _ => return Err(StorageError::Internal("finalize requires total_size and checksum".into())),
            };
            self.finalize_chunks(run_id, stream, total_size, &checksum).await?;
        }
        Ok(())
    }

    /// Concatenates chunk fragments, verifies length and SHA-256, compresses
    /// the whole with gzip, writes `{stream}.log.gz`, and deletes the chunk
    /// fragments. A checksum mismatch leaves `.log.gz` absent and all chunks
    /// retained (spec §8 "Boundary behaviors").
    pub async fn finalize_chunks(
        &self,
        run_id: &str,
        stream: LogStream,
        total_size: u64,
        checksum: &str,
    ) -> Result<(), StorageError> {
        let state = self.chunk_state_for(run_id, stream);
        let mut guard = state.lock().await;
        guard.fragments.sort_by_key(|(offset, _)| *offset);
        let mut concatenated = Vec::with_capacity(total_size as usize);
        for (_, chunk) in &guard.fragments {
            concatenated.extend_from_slice(chunk);
        }
        if concatenated.len() as u64 != total_size {
            return Err(StorageError::ChecksumMismatch {
                expected: checksum.to_string(),
                actual: format!("length {} != {}", concatenated.len(), total_size),
            });
        }
        let actual = hex::encode(Sha256::digest(&concatenated));
        if actual != checksum {
            return Err(StorageError::ChecksumMismatch { expected: checksum.to_string(), actual });
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&concatenated)?;
        let compressed = encoder.finish()?;
        self.store.put(&Self::gz_key(run_id, stream), compressed).await?;

        let offsets: Vec<String> =
            guard.fragments.iter().map(|(offset, _)| Self::chunk_key(run_id, stream, *offset)).collect();
        guard.fragments.clear();
        drop(guard);
        self.store.delete_many(&offsets).await
    }

    /// Ordered records in `[start_seq, start_seq + limit)`, preferring the
    /// recent in-memory cache before falling back to the durable ND-JSON
    /// object (spec §4.5 "Reads").
    pub async fn query(
        &self,
        run_id: &str,
        stream: LogStream,
        start_seq: u64,
        limit: usize,
    ) -> Result<(Vec<LogRecord>, bool), StorageError> {
        let buf = self.buffer_for(run_id, stream);
        let guard = buf.lock().await;
        let mut from_cache: Vec<LogRecord> =
            guard.recent.iter().filter(|r| r.sequence >= start_seq).cloned().collect();
        let cache_min = guard.recent.front().map(|r| r.sequence);
        drop(guard);

        let mut records = if cache_min.is_some_and(|min| min <= start_seq) {
            from_cache.sort_by_key(|r| r.sequence);
            from_cache.dedup_by_key(|r| r.sequence);
            from_cache
        } else {
            let key = Self::jsonl_key(run_id, stream);
            let mut records = match self.store.get(&key).await {
                Ok(bytes) => parse_jsonl(&bytes),
                Err(StorageError::NotFound(_)) => Vec::new(),
                Err(e) => return Err(e),
            };
            records.retain(|r| r.sequence >= start_seq);
            records.append(&mut from_cache);
            records.sort_by_key(|r| r.sequence);
            records.dedup_by_key(|r| r.sequence);
            records
        };
        let has_more = records.len() > limit;
        records.truncate(limit);
        Ok((records, has_more))
    }

    pub fn dropped_count(&self, run_id: &str, stream: LogStream) -> u64 {
        let buffers = self.buffers.lock();
        buffers
            .get(&(run_id.to_string(), stream))
            .map(|b| b.try_lock().map(|g| g.dropped).unwrap_or(0))
            .unwrap_or(0)
    }
}

fn parse_jsonl(bytes: &[u8]) -> Vec<LogRecord> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

#[cfg(test)]
#[path = "log_pipeline_tests.rs"]
mod tests;
