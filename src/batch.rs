//! Batch driver
//!
//! Reads the catalog file, walks its entries in order and, for each one,
//! either skips it (document already present), or generates and saves a
//! review. Failures stay local to their entry. Progress goes to a
//! [`ProgressSink`] so front ends can render it however they like.

use crate::catalog::{parse_table, MusicEntry};
use crate::error::ReviewError;
use crate::review::ReviewClient;
use crate::writer::ReviewWriter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    BatchStarted {
        input: PathBuf,
        total: usize,
    },
    EntryStarted {
        position: usize,
        total: usize,
        index: String,
        title: String,
    },
    EntrySkipped {
        position: usize,
        title: String,
        path: PathBuf,
    },
    EntrySaved {
        position: usize,
        title: String,
        path: PathBuf,
    },
    EntryFailed {
        position: usize,
        title: String,
        error: String,
    },
    BatchFinished {
        total: usize,
        saved: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Receiver of batch progress.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: BatchEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn emit(&self, _event: BatchEvent) {}
}

impl<F> ProgressSink for F
where
    F: Fn(BatchEvent) + Send + Sync,
{
    fn emit(&self, event: BatchEvent) {
        self(event)
    }
}

/// Forwards events over a tokio channel to a renderer on another task.
#[derive(Debug, Clone)]
pub struct ChannelSink(UnboundedSender<BatchEvent>);

impl ChannelSink {
    pub fn new(sender: UnboundedSender<BatchEvent>) -> Self {
        Self(sender)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: BatchEvent) {
        // A closed receiver only means nobody is watching anymore.
        let _ = self.0.send(event);
    }
}

/// Final state of one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Saved { path: PathBuf },
    Skipped { path: PathBuf },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub index: String,
    pub title: String,
    #[serde(flatten)]
    pub status: EntryStatus,
}

/// Result of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub input: PathBuf,
    pub total: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<EntryOutcome>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl BatchSummary {
    fn new(input: &Path, total: usize) -> Self {
        Self {
            input: input.to_path_buf(),
            total,
            saved: 0,
            skipped: 0,
            failed: 0,
            outcomes: Vec::with_capacity(total),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
        }
    }

    fn record(&mut self, entry: &MusicEntry, status: EntryStatus) {
        match &status {
            EntryStatus::Saved { .. } => self.saved += 1,
            EntryStatus::Skipped { .. } => self.skipped += 1,
            EntryStatus::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(EntryOutcome {
            index: entry.index.clone(),
            title: entry.title.clone(),
            status,
        });
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Read, parse and process the catalog at `input`.
///
/// Only an unreadable input aborts the run; everything else is recorded per
/// entry in the returned summary.
pub async fn run_batch(
    input: &Path,
    client: &mut ReviewClient,
    writer: &ReviewWriter,
    sink: &dyn ProgressSink,
) -> Result<BatchSummary, ReviewError> {
    let source = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| ReviewError::io(input, e))?;
    let entries = parse_table(&source);
    run_entries(input, &entries, client, writer, sink).await
}

/// Process already-parsed entries in order.
pub async fn run_entries(
    input: &Path,
    entries: &[MusicEntry],
    client: &mut ReviewClient,
    writer: &ReviewWriter,
    sink: &dyn ProgressSink,
) -> Result<BatchSummary, ReviewError> {
    let started = Instant::now();
    let total = entries.len();
    let mut summary = BatchSummary::new(input, total);
    let clock = client.clock();
    let post_success_delay = client.settings().pacing.post_success_delay();
    let pause_after_save = !client.is_simulated() && !post_success_delay.is_zero();

    info!(
        input = %input.display(),
        total,
        output_dir = %writer.output_dir().display(),
        simulate = client.is_simulated(),
        "Starting batch"
    );
    if total == 0 {
        warn!(input = %input.display(), "No entries found in input");
    }
    sink.emit(BatchEvent::BatchStarted {
        input: input.to_path_buf(),
        total,
    });

    for (offset, entry) in entries.iter().enumerate() {
        let position = offset + 1;
        let is_last = position == total;
        info!(
            index = %entry.index,
            title = %entry.title,
            position,
            total,
            "Processing entry"
        );
        sink.emit(BatchEvent::EntryStarted {
            position,
            total,
            index: entry.index.clone(),
            title: entry.title.clone(),
        });

        if let Some(path) = writer.existing_document(entry).await {
            info!(
                index = %entry.index,
                title = %entry.title,
                path = %path.display(),
                "Review already exists, skipping"
            );
            sink.emit(BatchEvent::EntrySkipped {
                position,
                title: entry.title.clone(),
                path: path.clone(),
            });
            summary.record(entry, EntryStatus::Skipped { path });
            continue;
        }

        let result = match client.generate_review(entry).await {
            Ok(review) => writer.write(entry, &review.text).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(outcome) => {
                let path = outcome.path().to_path_buf();
                sink.emit(BatchEvent::EntrySaved {
                    position,
                    title: entry.title.clone(),
                    path: path.clone(),
                });
                summary.record(entry, EntryStatus::Saved { path });

                if pause_after_save && !is_last {
                    info!(
                        wait_secs = post_success_delay.as_secs_f64(),
                        "Pausing before next entry"
                    );
                    clock.sleep(post_success_delay).await;
                }
            }
            Err(err) => {
                error!(
                    index = %entry.index,
                    title = %entry.title,
                    error = %err,
                    "Failed to process entry"
                );
                sink.emit(BatchEvent::EntryFailed {
                    position,
                    title: entry.title.clone(),
                    error: err.to_string(),
                });
                summary.record(entry, EntryStatus::Failed {
                    error: err.to_string(),
                });
            }
        }
    }

    summary.elapsed = started.elapsed();
    info!(
        total = summary.total,
        saved = summary.saved,
        skipped = summary.skipped,
        failed = summary.failed,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "Batch finished"
    );
    sink.emit(BatchEvent::BatchFinished {
        total: summary.total,
        saved: summary.saved,
        skipped: summary.skipped,
        failed: summary.failed,
    });
    Ok(summary)
}
