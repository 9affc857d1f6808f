use super::OutputHandler;
use crate::entry::{ATTR_REMOTE_ADDR, ATTR_TIME, ATTR_URI, Entry};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::Write;

pub struct CsvOutput<W: Write + Send> {
    writer: csv::Writer<W>,
    headers_written: bool,
}

impl<W: Write + Send> CsvOutput<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
            headers_written: false,
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Internal(e.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> OutputHandler for CsvOutput<W> {
    async fn write(&mut self, entry: &Entry) -> Result<()> {
        if !self.headers_written {
            self.writer
                .write_record(["host", ATTR_URI, ATTR_TIME, ATTR_REMOTE_ADDR])
                .map_err(|e| Error::Internal(e.to_string()))?;
            self.headers_written = true;
        }

        self.writer
            .write_record([
                entry.host.as_str(),
                entry.uri(),
                entry.request_processing_time(),
                entry.remote_addr(),
            ])
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
