//! Inter-event delay

use async_trait::async_trait;
use std::time::Duration;

/// Suspends playback between injections
#[async_trait]
pub trait Pacer: Send {
    async fn pause(&mut self, delay: Duration);
}

/// Sleeps on the blocking pool for microsecond granularity
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

#[async_trait]
impl Pacer for ThreadPacer {
    async fn pause(&mut self, delay: Duration) {
        if delay.is_zero() {
            return;
        }

        if let Err(e) = tokio::task::spawn_blocking(move || std::thread::sleep(delay)).await {
            tracing::warn!("Pause of {:?} interrupted: {}", delay, e);
        }
    }
}
