pub mod aggregator;
pub mod config;
pub mod dispatcher;
pub mod endpoint;
pub mod entry;
pub mod error;
pub mod fetch;
pub mod hosts;
pub mod metrics;
pub mod output;
pub mod parser;
pub mod server;
pub mod sort;

pub use aggregator::{Aggregator, Snapshot};
pub use dispatcher::Dispatcher;
pub use endpoint::Endpoint;
pub use entry::Entry;
pub use error::{Error, Result};
pub use fetch::{Credentials, HttpFetcher, StatusSource};
pub use hosts::{DnsResolver, HostExpander, Resolver};
pub use metrics::collector::MetricsCollector;
pub use metrics::report::MetricsReport;
pub use sort::{SortField, sort_entries};
