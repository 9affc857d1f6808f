use super::OutputHandler;
use crate::entry::Entry;
use crate::error::Result;
use async_trait::async_trait;
use std::io::Write;

/// Streams entries as a JSON array of `{host, attrs}` records, escaped so the
/// output can be embedded in an HTML page.
pub struct JsonOutput<W: Write + Send> {
    out: W,
    first: bool,
}

impl<W: Write + Send> JsonOutput<W> {
    pub fn new(out: W) -> Self {
        Self { out, first: true }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: Write + Send> OutputHandler for JsonOutput<W> {
    async fn write(&mut self, entry: &Entry) -> Result<()> {
        if self.first {
            write!(self.out, "[")?;
            self.first = false;
        } else {
            write!(self.out, ",")?;
        }

        let json = serde_json::to_string(entry)?;
        self.out.write_all(html_escape_json(&json).as_bytes())?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if self.first {
            write!(self.out, "[")?;
            self.first = false;
        }
        writeln!(self.out, "]")?;
        self.out.flush()?;
        Ok(())
    }
}

/// Serializes `entries` as an HTML-escaped JSON array.
pub fn entries_to_json(entries: &[Entry]) -> Result<String> {
    let json = serde_json::to_string(entries)?;
    Ok(html_escape_json(&json))
}

/// Replaces `<`, `>`, `&`, U+2028 and U+2029 in serialized JSON with their
/// `\uXXXX` escapes. Only valid for characters inside JSON strings, which is
/// the only place they can appear in serializer output.
pub fn html_escape_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            c => escaped.push(c),
        }
    }
    escaped
}
