use super::OutputHandler;
use crate::entry::Entry;
use crate::error::Result;
use async_trait::async_trait;
use std::io::Write;

/// Fixed-width table, one row per entry. Nothing is printed for an empty
/// snapshot, not even the header.
pub struct ConsoleOutput<W: Write + Send> {
    out: W,
    header_written: bool,
}

impl<W: Write + Send> ConsoleOutput<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn row(&mut self, host: &str, uri: &str, time: &str, ip: &str) -> Result<()> {
        writeln!(self.out, "{:<30.28}{:<40.38}{:<11.9}{:<18.16}", host, uri, time, ip)?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> OutputHandler for ConsoleOutput<W> {
    async fn write(&mut self, entry: &Entry) -> Result<()> {
        if !self.header_written {
            self.row("Host", "URI", "Time(ms)", "Remote IP")?;
            self.header_written = true;
        }
        self.row(
            &entry.host,
            entry.uri(),
            entry.request_processing_time(),
            entry.remote_addr(),
        )
    }

    async fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{ATTR_REMOTE_ADDR, ATTR_TIME, ATTR_URI};
    use crate::output::write_all;
    use std::collections::BTreeMap;

    fn entry(host: &str, uri: &str) -> Entry {
        Entry::new(
            host,
            BTreeMap::from([
                (ATTR_URI.to_string(), uri.to_string()),
                (ATTR_TIME.to_string(), "1234".to_string()),
                (ATTR_REMOTE_ADDR.to_string(), "192.168.100.200".to_string()),
            ]),
        )
    }

    #[tokio::test]
    async fn renders_fixed_width_rows() {
        let mut out = ConsoleOutput::new(Vec::new());
        write_all(&mut out, &[entry("app1:8080", "/index")]).await.unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Host"));
        assert_eq!(&lines[0][30..33], "URI");
        assert_eq!(&lines[0][70..78], "Time(ms)");
        assert_eq!(&lines[0][81..90], "Remote IP");
        assert_eq!(&lines[1][30..36], "/index");
        assert_eq!(&lines[1][70..74], "1234");
        assert_eq!(&lines[1][81..96], "192.168.100.200");
    }

    #[tokio::test]
    async fn long_values_are_truncated() {
        let long_uri = format!("/{}", "x".repeat(100));
        let mut out = ConsoleOutput::new(Vec::new());
        write_all(&mut out, &[entry(&"h".repeat(50), &long_uri)]).await.unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(&row[..30], format!("{}  ", "h".repeat(28)));
        assert_eq!(&row[30..70], format!("/{}  ", "x".repeat(37)));
    }

    #[tokio::test]
    async fn empty_snapshot_prints_nothing() {
        let mut out = ConsoleOutput::new(Vec::new());
        write_all(&mut out, &[]).await.unwrap();
        assert!(out.into_inner().is_empty());
    }
}
