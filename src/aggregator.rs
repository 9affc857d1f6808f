use crate::dispatcher::Dispatcher;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::fetch::StatusSource;
use crate::hosts::HostExpander;
use crate::metrics::report::MetricsReport;
use crate::sort::{SortField, sort_entries};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};

/// Result of one completed fetch cycle, ordered by `sort`.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub sort: SortField,
    pub fetched_at: Option<DateTime<Utc>>,
    pub endpoints: usize,
}

impl Snapshot {
    pub fn empty(sort: SortField) -> Self {
        Self {
            entries: Vec::new(),
            sort,
            fetched_at: None,
            endpoints: 0,
        }
    }

    fn resorted(&self, field: SortField) -> Self {
        let mut entries = self.entries.clone();
        sort_entries(field, &mut entries);
        Self {
            entries,
            sort: field,
            fetched_at: self.fetched_at,
            endpoints: self.endpoints,
        }
    }
}

/// Owns the configured host specs and the latest snapshot.
pub struct Aggregator {
    hosts: Vec<String>,
    expander: HostExpander,
    dispatcher: Dispatcher,
    source: Arc<dyn StatusSource>,
    snapshot: RwLock<Arc<Snapshot>>,
    cycle: Mutex<()>,
}

impl Aggregator {
    pub fn new(
        hosts: Vec<String>,
        default_sort: SortField,
        expander: HostExpander,
        dispatcher: Dispatcher,
        source: Arc<dyn StatusSource>,
    ) -> Self {
        Self {
            hosts,
            expander,
            dispatcher,
            source,
            snapshot: RwLock::new(Arc::new(Snapshot::empty(default_sort))),
            cycle: Mutex::new(()),
        }
    }

    /// Runs one fetch cycle and publishes its entries sorted by `sort`, or
    /// by the current snapshot's order when `None`.
    ///
    /// Returns `Error::NoEndpoints` without touching the snapshot when host
    /// expansion yields nothing.
    pub async fn refresh(&self, sort: Option<SortField>) -> Result<Arc<Snapshot>> {
        let _cycle = self.cycle.lock().await;

        let endpoints = self.expander.expand_all(&self.hosts).await;
        if endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }
        let endpoint_count = endpoints.len();
        log::info!("Fetching status from {} endpoints", endpoint_count);

        let mut entries = self.dispatcher.dispatch_all(endpoints, self.source.clone()).await;
        let sort = match sort {
            Some(field) => field,
            None => self.snapshot.read().await.sort,
        };
        sort_entries(sort, &mut entries);

        let snapshot = Arc::new(Snapshot {
            entries,
            sort,
            fetched_at: Some(Utc::now()),
            endpoints: endpoint_count,
        });
        *self.snapshot.write().await = snapshot.clone();
        Ok(snapshot)
    }

    /// Re-sorts the current snapshot without fetching.
    pub async fn resort(&self, field: SortField) -> Arc<Snapshot> {
        let mut guard = self.snapshot.write().await;
        if guard.sort != field {
            *guard = Arc::new(guard.resorted(field));
        }
        guard.clone()
    }

    pub async fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    pub fn get_metrics(&self) -> MetricsReport {
        self.dispatcher.get_metrics()
    }

    pub fn watch_metrics(&self) -> watch::Receiver<MetricsReport> {
        self.dispatcher.watch_metrics()
    }
}
