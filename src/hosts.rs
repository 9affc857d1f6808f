use crate::endpoint::with_default_scheme;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Token replaced by 1, 2, 3... in templated host specs.
pub const PLACEHOLDER: &str = "%d";

/// Highest instance number tried for a templated spec.
pub const MAX_EXPANSION: usize = 999;

#[async_trait]
pub trait Resolver: Send + Sync {
    /// True when `hostname` resolves to at least one address.
    async fn exists(&self, hostname: &str) -> bool;
}

/// Resolves through the system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsResolver;

#[async_trait]
impl Resolver for DnsResolver {
    async fn exists(&self, hostname: &str) -> bool {
        if hostname.is_empty() {
            return false;
        }
        match tokio::net::lookup_host((hostname, 0)).await {
            Ok(mut addrs) => addrs.next().is_some(),
            Err(e) => {
                log::debug!("DNS lookup for {} failed: {}", hostname, e);
                false
            }
        }
    }
}

/// Turns host specs into concrete endpoint specs.
#[derive(Clone)]
pub struct HostExpander {
    resolver: Arc<dyn Resolver>,
}

impl Default for HostExpander {
    fn default() -> Self {
        Self::new(Arc::new(DnsResolver))
    }
}

impl HostExpander {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }

    /// Expands a single spec.
    ///
    /// Templated specs produce instances 1..=k where k+1 is the first
    /// instance whose hostname does not resolve. Lookup failures are not
    /// reported; a shorter list is the only signal.
    ///
    /// A literal spec comes back unchanged. Blank specs expand to nothing and
    /// templates are trimmed before substitution.
    pub async fn expand(&self, spec: &str) -> Vec<String> {
        if spec.trim().is_empty() {
            return Vec::new();
        }
        if !spec.contains(PLACEHOLDER) {
            return vec![spec.to_string()];
        }
        let spec = spec.trim();

        let mut expanded = Vec::new();
        for i in 1..=MAX_EXPANSION {
            let candidate = spec.replace(PLACEHOLDER, &i.to_string());
            let hostname = hostname(&candidate);
            if !self.resolver.exists(&hostname).await {
                log::debug!("{} does not resolve, stopping expansion of {}", hostname, spec);
                break;
            }
            expanded.push(candidate);
        }

        if expanded.is_empty() {
            log::warn!("No instances of {} resolved", spec);
        } else {
            log::info!("Expanded {} into {} hosts", spec, expanded.len());
        }
        expanded
    }

    /// Expands every spec in order and flattens the result.
    pub async fn expand_all<S: AsRef<str>>(&self, specs: &[S]) -> Vec<String> {
        let mut endpoints = Vec::new();
        for spec in specs {
            endpoints.extend(self.expand(spec.as_ref()).await);
        }
        endpoints
    }
}

/// Host part of a spec, without scheme, port or path.
pub fn hostname(spec: &str) -> String {
    Url::parse(&with_default_scheme(spec))
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_matches(['[', ']']).to_string()))
        .unwrap_or_default()
}
