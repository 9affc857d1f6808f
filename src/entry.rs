use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ATTR_URI: &str = "uri";
pub const ATTR_TIME: &str = "requestProcessingTime";
pub const ATTR_REMOTE_ADDR: &str = "remoteAddr";

/// One busy worker thread observed on a remote host.
///
/// `attrs` always carries `uri`, `requestProcessingTime` and `remoteAddr`;
/// optional worker attributes are added when the remote reported them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub host: String,
    pub attrs: BTreeMap<String, String>,
}

impl Entry {
    pub fn new(host: impl Into<String>, attrs: BTreeMap<String, String>) -> Self {
        Self {
            host: host.into(),
            attrs,
        }
    }

    pub fn attr(&self, name: &str) -> &str {
        self.attrs.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn uri(&self) -> &str {
        self.attr(ATTR_URI)
    }

    pub fn request_processing_time(&self) -> &str {
        self.attr(ATTR_TIME)
    }

    pub fn remote_addr(&self) -> &str {
        self.attr(ATTR_REMOTE_ADDR)
    }
}
