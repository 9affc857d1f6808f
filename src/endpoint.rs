use crate::error::{Error, Result};
use url::Url;

/// Path of the manager status page used when a host spec carries no path.
pub const DEFAULT_STATUS_PATH: &str = "/manager/status";

/// Query asking the status servlet for its XML rendering.
pub const STATUS_QUERY: &str = "XML=true&XML=true";

/// A fetchable status location derived from an expanded host spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// `host[:port]`, used to label the entries parsed from this endpoint.
    pub host: String,
    pub url: Url,
}

impl Endpoint {
    /// Normalizes `server1.prod:8080` style specs into
    /// `http://server1.prod:8080/manager/status?XML=true&XML=true`.
    pub fn from_spec(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let with_scheme = with_default_scheme(spec);

        let mut url = Url::parse(&with_scheme).map_err(|e| Error::InvalidEndpoint {
            spec: spec.to_string(),
            reason: e.to_string(),
        })?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::InvalidEndpoint {
                spec: spec.to_string(),
                reason: "missing host".to_string(),
            });
        }
        let host = authority(&with_scheme).to_string();

        if !has_explicit_path(&with_scheme) {
            url.set_path(DEFAULT_STATUS_PATH);
        }
        url.set_query(Some(STATUS_QUERY));

        Ok(Self { host, url })
    }
}

pub(crate) fn with_default_scheme(spec: &str) -> String {
    if spec.contains("://") {
        spec.to_string()
    } else {
        format!("http://{}", spec)
    }
}

/// `host[:port]` exactly as written, without scheme, credentials or path.
fn authority(spec: &str) -> &str {
    let after_scheme = spec.split_once("://").map(|(_, rest)| rest).unwrap_or(spec);
    let end = after_scheme.find(['/', '?', '#']).unwrap_or(after_scheme.len());
    let authority = &after_scheme[..end];
    authority.rsplit_once('@').map(|(_, host)| host).unwrap_or(authority)
}

fn has_explicit_path(spec: &str) -> bool {
    let after_scheme = spec.split_once("://").map(|(_, rest)| rest).unwrap_or(spec);
    after_scheme
        .find(['/', '?', '#'])
        .map(|idx| after_scheme[idx..].starts_with('/'))
        .unwrap_or(false)
}
