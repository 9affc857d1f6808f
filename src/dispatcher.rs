use crate::endpoint::Endpoint;
use crate::entry::Entry;
use crate::fetch::StatusSource;
use crate::metrics::collector::MetricsCollector;
use crate::metrics::report::MetricsReport;
use crate::parser::parse_status;
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc, watch};

pub const DEFAULT_POOL_WIDTH: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Fixed-width worker pool draining a shared queue of endpoint specs.
pub struct Dispatcher {
    pool_width: usize,
    fetch_timeout: Duration,
    metrics: Arc<MetricsCollector>,
}

impl Dispatcher {
    pub fn new(pool_width: usize, fetch_timeout: Duration, metrics: Option<Arc<MetricsCollector>>) -> Self {
        Self {
            pool_width: pool_width.max(1),
            fetch_timeout,
            metrics: metrics.unwrap_or_else(|| Arc::new(MetricsCollector::new())),
        }
    }

    pub fn pool_width(&self) -> usize {
        self.pool_width
    }

    /// Attempts every endpoint exactly once and returns the concatenated
    /// per-worker batches, in no particular order.
    ///
    /// Failures are logged and contribute no entries; they never stop the
    /// remaining endpoints from being fetched.
    pub async fn dispatch_all(&self, endpoints: Vec<String>, source: Arc<dyn StatusSource>) -> Vec<Entry> {
        self.metrics.reset();
        self.metrics.add_endpoints_queued(endpoints.len() as u64);

        let (work_tx, work_rx) = mpsc::unbounded_channel();
        for spec in endpoints {
            // receiver is alive until the workers below are spawned
            let _ = work_tx.send(spec);
        }
        drop(work_tx);
        let queue = Arc::new(Mutex::new(work_rx));

        let workers: Vec<_> = (0..self.pool_width)
            .map(|id| {
                let queue = queue.clone();
                let source = source.clone();
                let metrics = self.metrics.clone();
                let timeout = self.fetch_timeout;

                tokio::spawn(async move {
                    let mut batch = Vec::new();
                    loop {
                        let next = queue.lock().await.recv().await;
                        let Some(spec) = next else { break };

                        metrics.increment_active_workers();
                        batch.extend(fetch_one(&spec, source.as_ref(), &metrics, timeout).await);
                        metrics.increment_endpoints_processed();
                        metrics.decrement_active_workers();
                    }
                    log::trace!("Worker {} finished with {} entries", id, batch.len());
                    batch
                })
            })
            .collect();

        let mut entries = Vec::new();
        for result in join_all(workers).await {
            match result {
                Ok(batch) => entries.extend(batch),
                Err(e) => log::error!("Fetch worker failed: {}", e),
            }
        }

        let report = self.metrics.report();
        log::info!(
            "Fetched {} endpoints ({} ok, {} failed) in {:.1}s, {} active requests",
            report.endpoints_processed,
            report.fetch_success,
            report.fetch_failed,
            report.elapsed_seconds,
            entries.len()
        );
        entries
    }

    pub fn get_metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    pub fn watch_metrics(&self) -> watch::Receiver<MetricsReport> {
        let (tx, rx) = watch::channel(self.metrics.report());
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(250));
            loop {
                interval.tick().await;
                if tx.send(metrics.report()).is_err() {
                    break;
                }
            }
        });
        rx
    }
}

async fn fetch_one(
    spec: &str,
    source: &dyn StatusSource,
    metrics: &MetricsCollector,
    timeout: Duration,
) -> Vec<Entry> {
    let endpoint = match Endpoint::from_spec(spec) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            log::error!("Error in host {}: {}", spec, e);
            metrics.record_failure(Duration::ZERO);
            return Vec::new();
        }
    };

    let start_time = Instant::now();
    let result = tokio::time::timeout(timeout, source.fetch(&endpoint)).await;
    let duration = start_time.elapsed();

    let body = match result {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            metrics.record_failure(duration);
            log::error!("Error fetching from {}: {}", endpoint.url, e);
            return Vec::new();
        }
        Err(_) => {
            metrics.record_failure(duration);
            log::error!("Timed out fetching from {} after {:?}", endpoint.url, timeout);
            return Vec::new();
        }
    };
    metrics.record_success(duration);

    let report = parse_status(&endpoint.host, &body);
    if !report.recognized() {
        metrics.increment_unrecognized_documents();
    }
    metrics.add_malformed_tags(report.malformed as u64);
    metrics.add_entries_extracted(report.entries.len() as u64);
    report.entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn worker(uri: &str) -> String {
        format!(
            r#"<worker requestProcessingTime="10" remoteAddr="10.0.0.1" currentUri="{}" />"#,
            uri
        )
    }

    /// Serves canned documents keyed by host; unknown hosts fail.
    #[derive(Default)]
    struct CannedSource {
        documents: HashMap<String, String>,
        slow: HashMap<String, Duration>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatusSource for CannedSource {
        async fn fetch(&self, endpoint: &Endpoint) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.slow.get(&endpoint.host) {
                tokio::time::sleep(*delay).await;
            }
            self.documents
                .get(&endpoint.host)
                .cloned()
                .ok_or_else(|| Error::Internal(format!("connection refused: {}", endpoint.host)))
        }
    }

    #[tokio::test]
    async fn unreachable_endpoints_contribute_nothing() {
        let mut source = CannedSource::default();
        for i in 0..7 {
            source
                .documents
                .insert(format!("up{}:8080", i), worker(&format!("/req/{}", i)));
        }
        let source = Arc::new(source);

        let mut endpoints: Vec<String> = (0..7).map(|i| format!("up{}:8080", i)).collect();
        endpoints.extend((0..3).map(|i| format!("down{}:8080", i)));

        let dispatcher = Dispatcher::new(4, Duration::from_secs(1), None);
        let entries = dispatcher.dispatch_all(endpoints, source.clone()).await;

        assert_eq!(entries.len(), 7);
        assert_eq!(source.calls.load(Ordering::SeqCst), 10);

        let report = dispatcher.get_metrics();
        assert_eq!(report.endpoints_processed, 10);
        assert_eq!(report.fetch_success, 7);
        assert_eq!(report.fetch_failed, 3);
        assert_eq!(report.active_workers, 0);
        assert!((report.success_rate - 70.0).abs() < 1e-9);
    }

    /// Records how many fetches overlap.
    #[derive(Default)]
    struct GaugeSource {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl StatusSource for GaugeSource {
        async fn fetch(&self, endpoint: &Endpoint) -> Result<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(worker(&format!("/{}", endpoint.host)))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_never_exceeds_pool_width() {
        let source = Arc::new(GaugeSource::default());
        let endpoints: Vec<String> = (0..40).map(|i| format!("node{}:8080", i)).collect();

        let dispatcher = Dispatcher::new(5, Duration::from_secs(1), None);
        let entries = dispatcher.dispatch_all(endpoints, source.clone()).await;

        assert_eq!(entries.len(), 40);
        let max = source.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 5, "{} fetches overlapped with a pool of 5", max);
        assert!(max > 1);
    }

    #[tokio::test]
    async fn invalid_spec_is_skipped() {
        let mut source = CannedSource::default();
        source.documents.insert("ok:8080".into(), worker("/a"));

        let dispatcher = Dispatcher::new(2, Duration::from_secs(1), None);
        let entries = dispatcher
            .dispatch_all(vec!["bad:port".into(), "ok:8080".into()], Arc::new(source))
            .await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host, "ok:8080");
    }

    #[tokio::test]
    async fn slow_endpoints_are_cut_off_by_timeout() {
        let mut source = CannedSource::default();
        for i in 0..6 {
            let host = format!("slow{}:8080", i);
            source.documents.insert(host.clone(), worker("/slow"));
            source.slow.insert(host, Duration::from_secs(30));
        }
        source.documents.insert("fast:8080".into(), worker("/fast"));

        let mut endpoints: Vec<String> = (0..6).map(|i| format!("slow{}:8080", i)).collect();
        endpoints.push("fast:8080".into());

        // 7 endpoints over 4 workers: at most two rounds of timeouts
        let timeout = Duration::from_millis(200);
        let dispatcher = Dispatcher::new(4, timeout, None);
        let started = Instant::now();
        let entries = dispatcher.dispatch_all(endpoints, Arc::new(source)).await;

        assert!(started.elapsed() < timeout * 2 + Duration::from_millis(500));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].uri(), "/fast");
        assert_eq!(dispatcher.get_metrics().fetch_failed, 6);
    }

    #[tokio::test]
    async fn unrecognized_documents_are_counted() {
        let mut source = CannedSource::default();
        source.documents.insert("login:8080".into(), "<html>login</html>".into());
        source.documents.insert("ok:8080".into(), worker("/a") + &worker("?"));

        let dispatcher = Dispatcher::new(DEFAULT_POOL_WIDTH, DEFAULT_TIMEOUT, None);
        let entries = dispatcher
            .dispatch_all(vec!["login:8080".into(), "ok:8080".into()], Arc::new(source))
            .await;

        assert_eq!(entries.len(), 1);
        let report = dispatcher.get_metrics();
        assert_eq!(report.unrecognized_documents, 1);
        assert_eq!(report.fetch_success, 2);
    }

    #[tokio::test]
    async fn empty_work_list_returns_immediately() {
        let dispatcher = Dispatcher::new(0, DEFAULT_TIMEOUT, None);
        assert_eq!(dispatcher.pool_width(), 1);
        let entries = dispatcher
            .dispatch_all(Vec::new(), Arc::new(CannedSource::default()))
            .await;
        assert!(entries.is_empty());
    }
}
