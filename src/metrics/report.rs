use serde::{Deserialize, Serialize};

/// Point-in-time copy of a fetch cycle's counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    pub endpoints_queued: u64,
    pub endpoints_processed: u64,
    pub fetch_success: u64,
    pub fetch_failed: u64,
    pub entries_extracted: u64,
    pub unrecognized_documents: u64,
    pub malformed_tags: u64,
    pub active_workers: u64,
    pub success_rate: f64,
    pub avg_response_time_ms: u64,
    pub elapsed_seconds: f64,
}
