use super::OutputHandler;
use crate::error::Result;
use crate::render::{HEADERS, RenderedRow};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct CsvOutput {
    writer: csv::Writer<std::fs::File>,
}

impl CsvOutput {
    /// Creates the file and writes the header row.
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(HEADERS)?;
        Ok(Self { writer })
    }
}

#[async_trait]
impl OutputHandler for CsvOutput {
    async fn write(&mut self, row: &RenderedRow) -> Result<()> {
        self.writer
            .write_record(row.cells.iter().map(|c| c.display_text()))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
