// Synchronizer metrics module
//
// Lightweight counters for what the synchronizer did over a session

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for one synchronizer instance.
///
/// Uses relaxed atomics so recording only needs `&self`. Counters can be
/// logged on actor teardown or periodically for long sessions.
#[derive(Debug)]
pub struct SyncMetrics {
    /// Frames observed by the post-update hook
    pub frames: AtomicU64,

    /// Successful model rebuilds
    pub rebuilds: AtomicU64,

    /// Rebuilds deferred to a safe checkpoint
    pub deferrals: AtomicU64,

    /// Pending rebuilds dropped because the selection reverted
    pub cancellations: AtomicU64,

    /// Rebuilds abandoned because the archive had no resource
    pub resource_misses: AtomicU64,

    /// Entry points called without a usable host context
    pub invalid_contexts: AtomicU64,

    /// Synchronizer start time
    start_time: Instant,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self {
            frames: AtomicU64::new(0),
            rebuilds: AtomicU64::new(0),
            deferrals: AtomicU64::new(0),
            cancellations: AtomicU64::new(0),
            resource_misses: AtomicU64::new(0),
            invalid_contexts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deferral(&self) {
        self.deferrals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_resource_miss(&self) {
        self.resource_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_context(&self) {
        self.invalid_contexts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Tunic Sync Metrics Summary ===");
        tracing::info!(
            "Frames: {}, uptime {:.2}s",
            self.frames.load(Ordering::Relaxed),
            self.uptime().as_secs_f64()
        );
        tracing::info!(
            "Rebuilds: {}, deferred: {}, cancelled: {}",
            self.rebuilds.load(Ordering::Relaxed),
            self.deferrals.load(Ordering::Relaxed),
            self.cancellations.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Skipped: {} missing resources, {} invalid contexts",
            self.resource_misses.load(Ordering::Relaxed),
            self.invalid_contexts.load(Ordering::Relaxed)
        );
    }
}

impl Default for SyncMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = SyncMetrics::new();
        assert_eq!(metrics.frames.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.rebuild_count(), 0);
    }

    #[test]
    fn test_record_operations() {
        let metrics = SyncMetrics::new();

        metrics.record_frame();
        metrics.record_frame();
        metrics.record_rebuild();
        metrics.record_deferral();
        metrics.record_deferral();
        metrics.record_cancellation();
        metrics.record_resource_miss();
        metrics.record_invalid_context();

        assert_eq!(metrics.frames.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.rebuild_count(), 1);
        assert_eq!(metrics.deferrals.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.cancellations.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.resource_misses.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.invalid_contexts.load(Ordering::Relaxed), 1);
    }
}
