use crate::aggregator::Aggregator;
use crate::config::schema::PollerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::fetch::{Credentials, HttpFetcher};
use crate::hosts::HostExpander;
use crate::output::OutputFormat;
use crate::sort::SortField;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Command-line values layered over the config file. `None` keeps the file
/// value; `hosts` are appended after the file's hosts.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hosts: Vec<String>,
    pub sort: Option<SortField>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_ms: Option<u64>,
    pub concurrency: Option<usize>,
    pub serve: bool,
    pub port: Option<u16>,
    pub output: Option<OutputFormat>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<PollerConfig> {
        let config = Self::load_file(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves the effective configuration from an optional file plus
    /// command-line overrides.
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<PollerConfig> {
        let base = match path {
            Some(path) => Self::load_file(path)?,
            None => PollerConfig::default(),
        };
        let config = Self::merge(base, overrides);
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<PollerConfig> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let config: PollerConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            Some("yaml") | Some("yml") => {
                let config: PollerConfig = serde_yaml::from_str(&content)?;
                Ok(config)
            }
            Some("toml") => {
                let config: PollerConfig = toml::from_str(&content)?;
                Ok(config)
            }
            _ => Err(Error::Config(format!(
                "Unsupported file extension: {}",
                path.display()
            ))),
        }
    }

    fn merge(mut base: PollerConfig, overrides: Overrides) -> PollerConfig {
        base.hosts.extend(overrides.hosts);
        if let Some(sort) = overrides.sort {
            base.sort = sort;
        }
        if overrides.username.is_some() {
            base.username = overrides.username;
        }
        if overrides.password.is_some() {
            base.password = overrides.password;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            base.timeout_ms = timeout_ms;
        }
        if let Some(concurrency) = overrides.concurrency {
            base.concurrency = concurrency;
        }
        base.serve |= overrides.serve;
        if let Some(port) = overrides.port {
            base.port = port;
        }
        if let Some(output) = overrides.output {
            base.output = output;
        }
        base
    }

    pub fn create_aggregator(config: &PollerConfig) -> Result<Aggregator> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let credentials = Credentials::from_parts(config.username.clone(), config.password.clone());
        let fetcher = HttpFetcher::new(timeout, credentials)?;

        Ok(Aggregator::new(
            config.hosts.clone(),
            config.sort,
            HostExpander::default(),
            Dispatcher::new(config.concurrency, timeout, None),
            Arc::new(fetcher),
        ))
    }
}
