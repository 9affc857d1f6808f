use crate::dispatcher::{DEFAULT_POOL_WIDTH, DEFAULT_TIMEOUT};
use crate::output::OutputFormat;
use crate::sort::SortField;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PollerConfig {
    /// Host specs, each either `host:port` or a `%d` template.
    #[serde(default)]
    pub hosts: Vec<String>,

    #[serde(default)]
    pub sort: SortField,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1))]
    pub timeout_ms: u64,

    /// Width of the fetch worker pool.
    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 10000))]
    pub concurrency: usize,

    #[serde(default)]
    pub serve: bool,

    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    #[serde(default)]
    pub output: OutputFormat,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            sort: SortField::default(),
            username: None,
            password: None,
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
            serve: false,
            port: default_port(),
            output: OutputFormat::default(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_concurrency() -> usize {
    DEFAULT_POOL_WIDTH
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
