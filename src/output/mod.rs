use crate::entry::Entry;
use crate::error::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;

pub mod console;
pub mod csv;
pub mod json;

#[async_trait]
pub trait OutputHandler: Send {
    async fn write(&mut self, entry: &Entry) -> Result<()>;
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Csv,
}

pub fn handler_for(format: OutputFormat, out: Box<dyn Write + Send>) -> Box<dyn OutputHandler> {
    match format {
        OutputFormat::Console => Box::new(console::ConsoleOutput::new(out)),
        OutputFormat::Json => Box::new(json::JsonOutput::new(out)),
        OutputFormat::Csv => Box::new(csv::CsvOutput::new(out)),
    }
}

/// Writes every entry through `handler` and closes it.
pub async fn write_all(handler: &mut dyn OutputHandler, entries: &[Entry]) -> Result<()> {
    for entry in entries {
        handler.write(entry).await?;
    }
    handler.close().await
}
