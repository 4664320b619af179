//! Replay engine

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::{Pacer, PlaybackCursor, FIRST_EVENT_DELAY};
use crate::device::EventSink;
use crate::event::{InputEvent, RecordDecoder, RECORD_SIZE};

/// Errors that end a replay
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Unable to open input event log file {path}: {source}")]
    LogUnavailable { path: PathBuf, source: io::Error },

    #[error("Reading input event log failed: {0}")]
    LogRead(#[source] io::Error),
}

/// How a replay ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Failed,
}

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    Idle,
    Opening,
    Replaying,
    Finished(Outcome),
}

/// Summary of one replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Records written to the sink
    pub injected: u64,
    /// Records whose injection failed
    pub dropped: u64,
    /// Bytes after the last complete record
    pub trailing_bytes: usize,
    /// Sum of all waits
    pub total_delay: Duration,
}

impl ReplayReport {
    /// Injection attempts, successful or not
    pub fn attempts(&self) -> u64 {
        self.injected + self.dropped
    }
}

pub struct ReplayEngine<P: Pacer> {
    pacer: P,
    first_event_delay: Duration,
    state: ReplayState,
}

impl<P: Pacer> ReplayEngine<P> {
    pub fn new(pacer: P) -> Self {
        Self {
            pacer,
            first_event_delay: FIRST_EVENT_DELAY,
            state: ReplayState::Idle,
        }
    }

    pub fn with_first_event_delay(mut self, delay: Duration) -> Self {
        self.first_event_delay = delay;
        self
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Open the log at `path` and replay it into `sink`
    pub async fn play_file<S: EventSink>(
        &mut self,
        path: &Path,
        sink: &mut S,
    ) -> Result<ReplayReport, ReplayError> {
        self.transition(ReplayState::Opening);

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(source) => {
                self.transition(ReplayState::Finished(Outcome::Failed));
                return Err(ReplayError::LogUnavailable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        tracing::info!("Replaying events from {}", path.display());
        self.play(file, sink).await
    }

    /// Replay every complete record read from `reader`
    pub async fn play<R, S>(
        &mut self,
        mut reader: R,
        sink: &mut S,
    ) -> Result<ReplayReport, ReplayError>
    where
        R: AsyncRead + Unpin,
        S: EventSink,
    {
        let mut cursor = PlaybackCursor::new();
        let mut decoder = RecordDecoder::new();
        let mut report = ReplayReport::default();

        self.transition(ReplayState::Replaying);

        loop {
            while let Some(event) = decoder.decode() {
                self.replay_one(&event, &mut cursor, sink, &mut report).await;
            }

            match reader.read_buf(decoder.buffer_mut()).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!(
                        "Log read failed after {} records: {}",
                        report.attempts(),
                        e
                    );
                    self.transition(ReplayState::Finished(Outcome::Failed));
                    return Err(ReplayError::LogRead(e));
                }
            }
        }

        report.trailing_bytes = decoder.pending();
        if report.trailing_bytes > 0 {
            tracing::warn!(
                "Ignoring {} trailing bytes (incomplete {}-byte record)",
                report.trailing_bytes,
                RECORD_SIZE
            );
        }

        self.transition(ReplayState::Finished(Outcome::Completed));
        tracing::info!(
            "Replay finished: {} injected, {} dropped, {:?} paced",
            report.injected,
            report.dropped,
            report.total_delay
        );
        Ok(report)
    }

    async fn replay_one<S: EventSink>(
        &mut self,
        event: &InputEvent,
        cursor: &mut PlaybackCursor,
        sink: &mut S,
        report: &mut ReplayReport,
    ) {
        // Pause before injecting: each record then lands its recorded gap
        // after its predecessor, and the first one lands after the fixed delay.
        let delay = cursor.advance(event.time, self.first_event_delay);
        report.total_delay += delay;
        self.pacer.pause(delay).await;

        match sink.inject(event) {
            Ok(()) => {
                tracing::trace!("{} after {:?}", event, delay);
                report.injected += 1;
            }
            Err(e) => {
                tracing::warn!("Dropped {}: {}", event, e);
                report.dropped += 1;
            }
        }
    }

    fn transition(&mut self, next: ReplayState) {
        tracing::debug!("Replay state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
