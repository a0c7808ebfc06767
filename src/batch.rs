//! Batch research over a JSONL file of topics.
//!
//! Input lines are `{"id": ..., "prompt": "..."}`. Each successful topic is
//! appended to the output file as `{"id": ..., "prompt": "...", "report": "..."}`
//! and flushed right away, so an interrupted batch can be resumed: ids already
//! present in the output are skipped on the next run.

use crate::error::Result;
use crate::orchestrator::Orchestrator;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// One topic to research.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: serde_json::Value,
    pub prompt: String,
}

impl BatchRecord {
    /// Stable key for matching input ids against existing output.
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

/// One completed topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: serde_json::Value,
    pub prompt: String,
    pub report: String,
}

/// Parsed input file.
#[derive(Debug, Default)]
pub struct BatchInput {
    pub records: Vec<BatchRecord>,
    /// Lines skipped because they were not valid records.
    pub malformed: usize,
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// The record passed the resume filter and waits for a worker.
    Queued { record: &'a BatchRecord },
    Completed { record: &'a BatchRecord, search_count: usize },
    Failed { record: &'a BatchRecord, error: String },
}

/// Totals for a finished batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    pub skipped_existing: usize,
    pub malformed: usize,
}

/// Read topic records, skipping blank lines and warning on malformed ones.
///
/// A line that is not valid UTF-8 counts as malformed.
pub fn read_records(path: &Path) -> Result<BatchInput> {
    let file = std::fs::File::open(path)?;
    let mut input = BatchInput::default();

    for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
        let line = line?;
        let text = match std::str::from_utf8(&line) {
            Ok(text) => text.trim(),
            Err(e) => {
                warn!("Skipping malformed line {}: {}", index + 1, e);
                input.malformed += 1;
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }

        match serde_json::from_str::<BatchRecord>(text) {
            Ok(record) => input.records.push(record),
            Err(e) => {
                warn!("Skipping malformed line {}: {} ({})", index + 1, text, e);
                input.malformed += 1;
            }
        }
    }

    Ok(input)
}

/// Ids already written to an output file. A missing file has none.
pub fn completed_ids(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }

    let file = std::fs::File::open(path)?;
    let mut ids = HashSet::new();
    for line in BufReader::new(file).split(b'\n') {
        let line = line?;
        // A partially written last line may end mid-character; it is ignored
        // and its topic runs again.
        if let Ok(record) = serde_json::from_slice::<OutputRecord>(&line) {
            ids.insert(record.id.to_string());
        }
    }
    Ok(ids)
}

/// Whether a file is empty or ends with a newline.
fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = std::fs::File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Runs every topic of an input file through one strategy.
pub struct BatchRunner<'a> {
    orchestrator: &'a Orchestrator,
    strategy: String,
    concurrency: usize,
}

impl<'a> BatchRunner<'a> {
    pub fn new(orchestrator: &'a Orchestrator, strategy: &str) -> Self {
        Self {
            orchestrator,
            strategy: strategy.to_string(),
            concurrency: orchestrator.settings().batch.concurrency,
        }
    }

    /// Set how many topics run at the same time.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Process `input` and append results to `output`.
    ///
    /// A failing topic is logged and counted; it never stops the batch.
    /// Errors returned here are setup failures (unknown strategy, unreadable
    /// input, unwritable output).
    #[instrument(skip(self, on_event), fields(strategy = %self.strategy))]
    pub async fn run<F>(&self, input: &Path, output: &Path, mut on_event: F) -> Result<BatchSummary>
    where
        F: FnMut(BatchEvent<'_>),
    {
        // Fail on an unknown strategy before touching any topic.
        self.orchestrator.strategy(&self.strategy)?;

        let parsed = read_records(input)?;
        let done = completed_ids(output)?;

        let mut summary = BatchSummary {
            malformed: parsed.malformed,
            ..BatchSummary::default()
        };

        let pending: Vec<BatchRecord> = parsed
            .records
            .into_iter()
            .filter(|record| {
                let seen = done.contains(&record.key());
                if seen {
                    info!("Skipping id {} (already in output)", record.key());
                    summary.skipped_existing += 1;
                }
                !seen
            })
            .collect();

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = OpenOptions::new().create(true).append(true).open(output)?;
        if !ends_with_newline(output)? {
            // Keep the next record off a partially written last line.
            writeln!(out)?;
        }

        info!(
            "Processing {} topic(s) with concurrency {}",
            pending.len(),
            self.concurrency
        );

        for record in &pending {
            on_event(BatchEvent::Queued { record });
        }

        let mut results = futures::stream::iter(pending.iter())
            .map(|record| async move {
                let result = self
                    .orchestrator
                    .run_pipeline(&record.prompt, &self.strategy)
                    .await;
                (record, result)
            })
            .buffer_unordered(self.concurrency);

        while let Some((record, result)) = results.next().await {
            match result {
                Ok(research) => {
                    let line = serde_json::to_string(&OutputRecord {
                        id: record.id.clone(),
                        prompt: record.prompt.clone(),
                        report: research.report,
                    })?;
                    writeln!(out, "{}", line)?;
                    out.flush()?;

                    summary.completed += 1;
                    info!("Saved id {}", record.key());
                    on_event(BatchEvent::Completed {
                        record,
                        search_count: research.metadata.search_count,
                    });
                }
                Err(e) => {
                    summary.failed += 1;
                    error!("Failed id {}: {}", record.key(), e);
                    on_event(BatchEvent::Failed {
                        record,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(summary)
    }
}
