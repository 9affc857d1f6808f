//! Lexical scanner for the `?XML=true` status document.
//!
//! The document is treated as semi-structured text: every `<worker ...>` tag
//! is located with a pattern match and its attributes are extracted with
//! independent attribute matches. Truncated or otherwise invalid XML still
//! yields whatever worker tags can be found.

use crate::entry::{ATTR_REMOTE_ADDR, ATTR_TIME, ATTR_URI, Entry};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Upper bound on worker tags read from a single document.
pub const MAX_WORKER_TAGS: usize = 10_000;

/// `currentUri` value reported by a worker with no request in flight.
pub const IDLE_URI: &str = "?";

const CURRENT_URI: &str = "currentUri";

/// Worker attributes copied into the entry when present.
const OPTIONAL_ATTRIBUTES: [&str; 5] = [
    "method",
    "protocol",
    "virtualHost",
    "currentQueryString",
    "stage",
];

static WORKER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<worker\s+[^>]+").expect("valid worker tag regex"));

static ATTRIBUTES: LazyLock<BTreeMap<&'static str, Regex>> = LazyLock::new(|| {
    [CURRENT_URI, ATTR_TIME, ATTR_REMOTE_ADDR]
        .into_iter()
        .chain(OPTIONAL_ATTRIBUTES)
        .map(|name| {
            let re = Regex::new(&format!(r#"\b{}="([^"]+)"#, name)).expect("valid attribute regex");
            (name, re)
        })
        .collect()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub entries: Vec<Entry>,
    pub tags_matched: usize,
    pub idle: usize,
    pub malformed: usize,
}

impl ParseReport {
    /// False when the document contained no worker tags at all.
    pub fn recognized(&self) -> bool {
        self.tags_matched > 0
    }
}

/// Outcome of reading a single worker tag.
#[derive(Debug, PartialEq, Eq)]
enum Worker {
    Busy(BTreeMap<String, String>),
    Idle,
    Malformed(&'static str),
}

pub fn parse_status(host: &str, document: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for tag in WORKER_TAG.find_iter(document).take(MAX_WORKER_TAGS) {
        report.tags_matched += 1;
        match read_worker(tag.as_str()) {
            Worker::Busy(attrs) => report.entries.push(Entry::new(host, attrs)),
            Worker::Idle => report.idle += 1,
            Worker::Malformed(missing) => {
                report.malformed += 1;
                log::warn!(
                    "Skipping worker tag from {} without {} attribute",
                    host,
                    missing
                );
            }
        }
    }

    if !report.recognized() {
        log::warn!("Unknown status format from {}", host);
    }
    log::debug!(
        "{}: {} worker tags, {} busy, {} idle, {} malformed",
        host,
        report.tags_matched,
        report.entries.len(),
        report.idle,
        report.malformed
    );

    report
}

/// Busy workers found in `document`, tagged with `host`.
pub fn parse(host: &str, document: &str) -> Vec<Entry> {
    parse_status(host, document).entries
}

fn read_worker(tag: &str) -> Worker {
    let tag = unescape_entities(tag);

    let uri = match attribute(&tag, CURRENT_URI) {
        Some(uri) => uri,
        None => return Worker::Malformed(CURRENT_URI),
    };
    if uri == IDLE_URI {
        return Worker::Idle;
    }

    let mut attrs = BTreeMap::new();
    attrs.insert(ATTR_URI.to_string(), uri.to_string());
    for name in [ATTR_TIME, ATTR_REMOTE_ADDR] {
        match attribute(&tag, name) {
            Some(value) => {
                attrs.insert(name.to_string(), value.to_string());
            }
            None => return Worker::Malformed(name),
        }
    }
    for name in OPTIONAL_ATTRIBUTES {
        if let Some(value) = attribute(&tag, name) {
            attrs.insert(name.to_string(), value.to_string());
        }
    }

    Worker::Busy(attrs)
}

fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    ATTRIBUTES
        .get(name)?
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Decodes HTML character references: the named HTML5 set plus decimal and
/// hex numeric references. Decoding is a single pass, so `&amp;lt;` becomes
/// `&lt;`. Unknown entities are left as-is.
pub fn unescape_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
