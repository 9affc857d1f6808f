use crate::metrics::report::MetricsReport;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct MetricsCollector {
    endpoints_queued: Arc<AtomicU64>,
    endpoints_processed: Arc<AtomicU64>,
    fetch_success: Arc<AtomicU64>,
    fetch_failed: Arc<AtomicU64>,
    entries_extracted: Arc<AtomicU64>,
    unrecognized_documents: Arc<AtomicU64>,
    malformed_tags: Arc<AtomicU64>,
    active_workers: Arc<AtomicU64>,
    total_response_time_ms: Arc<AtomicU64>,
    start_time: Arc<Mutex<Instant>>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            endpoints_queued: Arc::new(AtomicU64::new(0)),
            endpoints_processed: Arc::new(AtomicU64::new(0)),
            fetch_success: Arc::new(AtomicU64::new(0)),
            fetch_failed: Arc::new(AtomicU64::new(0)),
            entries_extracted: Arc::new(AtomicU64::new(0)),
            unrecognized_documents: Arc::new(AtomicU64::new(0)),
            malformed_tags: Arc::new(AtomicU64::new(0)),
            active_workers: Arc::new(AtomicU64::new(0)),
            total_response_time_ms: Arc::new(AtomicU64::new(0)),
            start_time: Arc::new(Mutex::new(Instant::now())),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter at the start of a fetch cycle.
    pub fn reset(&self) {
        for counter in [
            &self.endpoints_queued,
            &self.endpoints_processed,
            &self.fetch_success,
            &self.fetch_failed,
            &self.entries_extracted,
            &self.unrecognized_documents,
            &self.malformed_tags,
            &self.active_workers,
            &self.total_response_time_ms,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
        if let Ok(mut start) = self.start_time.lock() {
            *start = Instant::now();
        }
    }

    pub fn add_endpoints_queued(&self, count: u64) {
        self.endpoints_queued.fetch_add(count, Ordering::SeqCst);
    }

    pub fn increment_endpoints_processed(&self) {
        self.endpoints_processed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_entries_extracted(&self, count: u64) {
        self.entries_extracted.fetch_add(count, Ordering::SeqCst);
    }

    pub fn increment_unrecognized_documents(&self) {
        self.unrecognized_documents.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_malformed_tags(&self, count: u64) {
        self.malformed_tags.fetch_add(count, Ordering::SeqCst);
    }

    pub fn increment_active_workers(&self) {
        self.active_workers.fetch_add(1, Ordering::SeqCst);
    }

    pub fn decrement_active_workers(&self) {
        self.active_workers.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn record_success(&self, duration: Duration) {
        self.fetch_success.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn record_failure(&self, duration: Duration) {
        self.fetch_failed.fetch_add(1, Ordering::SeqCst);
        self.total_response_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn report(&self) -> MetricsReport {
        let success = self.fetch_success.load(Ordering::SeqCst);
        let failed = self.fetch_failed.load(Ordering::SeqCst);
        let total_requests = success + failed;
        let total_time = self.total_response_time_ms.load(Ordering::SeqCst);

        let success_rate = if total_requests > 0 {
            (success as f64 / total_requests as f64) * 100.0
        } else {
            0.0
        };

        let avg_response_time_ms = if total_requests > 0 {
            total_time / total_requests
        } else {
            0
        };

        let elapsed_seconds = self
            .start_time
            .lock()
            .map(|start| start.elapsed().as_secs_f64())
            .unwrap_or_default();

        MetricsReport {
            endpoints_queued: self.endpoints_queued.load(Ordering::SeqCst),
            endpoints_processed: self.endpoints_processed.load(Ordering::SeqCst),
            fetch_success: success,
            fetch_failed: failed,
            entries_extracted: self.entries_extracted.load(Ordering::SeqCst),
            unrecognized_documents: self.unrecognized_documents.load(Ordering::SeqCst),
            malformed_tags: self.malformed_tags.load(Ordering::SeqCst),
            active_workers: self.active_workers.load(Ordering::SeqCst),
            success_rate,
            avg_response_time_ms,
            elapsed_seconds,
        }
    }
}
