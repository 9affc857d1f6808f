use crate::entry::Entry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Host,
    Uri,
    Time,
    Ip,
}

impl SortField {
    /// Like `from_str`, but anything unrecognized falls back to `Host`.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Host => "host",
            SortField::Uri => "uri",
            SortField::Time => "time",
            SortField::Ip => "ip",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host" => Ok(SortField::Host),
            "uri" => Ok(SortField::Uri),
            "time" => Ok(SortField::Time),
            "ip" => Ok(SortField::Ip),
            other => Err(format!("unknown sort field: {}", other)),
        }
    }
}

/// Sorts in place. Text fields ascend lexicographically (`ip` included, so
/// "10.0.0.10" sorts before "10.0.0.2"); `time` descends numerically with
/// unparsable values after every parsable one.
pub fn sort_entries(field: SortField, entries: &mut [Entry]) {
    match field {
        SortField::Host => entries.sort_by(|a, b| a.host.cmp(&b.host)),
        SortField::Uri => entries.sort_by(|a, b| a.uri().cmp(b.uri())),
        SortField::Ip => entries.sort_by(|a, b| a.remote_addr().cmp(b.remote_addr())),
        SortField::Time => entries.sort_by(compare_time),
    }
}

fn compare_time(a: &Entry, b: &Entry) -> Ordering {
    let a = a.request_processing_time().parse::<i64>().ok();
    let b = b.request_processing_time().parse::<i64>().ok();
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ATTR_REMOTE_ADDR, ATTR_TIME, ATTR_URI};
    use std::collections::BTreeMap;

    fn entry(host: &str, uri: &str, time: &str, ip: &str) -> Entry {
        let attrs = BTreeMap::from([
            (ATTR_URI.to_string(), uri.to_string()),
            (ATTR_TIME.to_string(), time.to_string()),
            (ATTR_REMOTE_ADDR.to_string(), ip.to_string()),
        ]);
        Entry::new(host, attrs)
    }

    fn times(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.request_processing_time()).collect()
    }

    #[test]
    fn time_sorts_longest_first_with_unparsable_last() {
        let mut entries = vec![
            entry("a", "/", "50", "1"),
            entry("a", "/", "200", "1"),
            entry("a", "/", "bad", "1"),
        ];
        sort_entries(SortField::Time, &mut entries);
        assert_eq!(times(&entries), vec!["200", "50", "bad"]);

        let mut entries = vec![
            entry("a", "/", "bad", "1"),
            entry("a", "/", "7", "1"),
            entry("a", "/", "", "1"),
            entry("a", "/", "7000", "1"),
            entry("a", "/", "-3", "1"),
        ];
        sort_entries(SortField::Time, &mut entries);
        assert_eq!(times(&entries), vec!["7000", "7", "-3", "bad", ""]);
    }

    #[test]
    fn ip_sorts_as_text() {
        let mut entries = vec![
            entry("a", "/", "1", "10.0.0.2"),
            entry("a", "/", "1", "10.0.0.10"),
        ];
        sort_entries(SortField::Ip, &mut entries);
        let ips: Vec<_> = entries.iter().map(|e| e.remote_addr()).collect();
        assert_eq!(ips, vec!["10.0.0.10", "10.0.0.2"]);
    }

    #[test]
    fn host_and_uri_sort_ascending() {
        let mut entries = vec![
            entry("web2:8080", "/b", "1", "x"),
            entry("web10:8080", "/c", "1", "x"),
            entry("web1:8080", "/a", "1", "x"),
        ];

        sort_entries(SortField::Host, &mut entries);
        let hosts: Vec<_> = entries.iter().map(|e| e.host.as_str()).collect();
        assert_eq!(hosts, vec!["web10:8080", "web1:8080", "web2:8080"]);

        sort_entries(SortField::Uri, &mut entries);
        let uris: Vec<_> = entries.iter().map(|e| e.uri()).collect();
        assert_eq!(uris, vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn unknown_field_defaults_to_host() {
        assert_eq!(SortField::parse_lossy("bogus"), SortField::Host);
        assert_eq!(SortField::parse_lossy(""), SortField::Host);
        assert_eq!(SortField::parse_lossy("TIME"), SortField::Time);
        assert_eq!(SortField::parse_lossy("ip"), SortField::Ip);
        assert!("bogus".parse::<SortField>().is_err());
    }
}
