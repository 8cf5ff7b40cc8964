// Scenario D (spec §8) — log order under concurrency: 10,000 records with
// sequence 1..10,000 submitted for one (run_id, stdout) in 100 batches of
// 100, in parallel from two "Worker" tasks. A subsequent query over the
// full range must return exactly 1..10,000 in order, no gaps, no dupes.

use grid_storage::{LogPipeline, LogPipelineConfig, LogRecord, LogStream};
use std::sync::Arc;

#[tokio::test]
async fn concurrent_batches_preserve_sequence_order() {
    let dir = tempfile::tempdir().unwrap();
    let object_store = Arc::new(grid_storage::FsObjectStore::new(dir.path()));
    let pipeline = Arc::new(LogPipeline::new(object_store, LogPipelineConfig::default()));
    let run_id = "run-scenario-d";

    let batches: Vec<Vec<LogRecord>> = (0..100)
        .map(|batch| {
            (0..100)
                .map(|i| {
                    let sequence = (batch * 100 + i + 1) as u64;
                    LogRecord { sequence, timestamp_ms: sequence, level: "info".into(), content: format!("line {sequence}"), source: None }
                })
                .collect()
        })
        .collect();

    let mut handles = Vec::new();
    for (i, batch) in batches.into_iter().enumerate() {
        let pipeline = pipeline.clone();
        let run_id = run_id.to_string();
        handles.push(tokio::spawn(async move {
            // Alternate which of the two simulated Worker threads submits
            // this batch; both write into the same (run_id, stream) key.
            let _worker = i % 2;
            pipeline.submit_batch(&run_id, LogStream::Stdout, batch).await.unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    pipeline.flush(run_id, LogStream::Stdout).await.unwrap();

    let (records, has_more) = pipeline.query(run_id, LogStream::Stdout, 0, 10_000).await.unwrap();
    assert!(!has_more);
    assert_eq!(records.len(), 10_000);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.sequence, (i + 1) as u64, "gap or duplicate at position {i}");
    }
}
