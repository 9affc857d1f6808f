pub mod collector;
pub mod report;

pub use collector::MetricsCollector;
pub use report::MetricsReport;
