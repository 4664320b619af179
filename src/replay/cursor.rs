//! Playback cursor

use std::time::Duration;

use crate::event::EventTime;

/// Timestamp of the most recently replayed record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    previous: Option<EventTime>,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<EventTime> {
        self.previous
    }

    /// Compute the wait before `time` and move the cursor onto it.
    ///
    /// The first record always waits `first_delay`. A record older than its
    /// predecessor waits zero.
    pub fn advance(&mut self, time: EventTime, first_delay: Duration) -> Duration {
        let delay = match self.previous {
            None => first_delay,
            Some(previous) => {
                let gap = time.micros_since(&previous);
                if gap < 0 {
                    tracing::warn!(
                        "Record at {} precedes previous record at {}, not waiting",
                        time,
                        previous
                    );
                    Duration::ZERO
                } else {
                    Duration::from_micros(gap as u64)
                }
            }
        };

        self.previous = Some(time);
        delay
    }
}
