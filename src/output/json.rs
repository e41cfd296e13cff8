use super::OutputHandler;
use crate::error::Result;
use crate::model::ScrapeResult;
use crate::render::RenderedRow;
use async_trait::async_trait;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Serialize)]
struct JsonRow<'a> {
    ordinal: usize,
    #[serde(flatten)]
    result: &'a ScrapeResult,
}

/// Streams rows as a JSON array in the server's record shape.
pub struct JsonOutput {
    file: File,
    first: bool,
}

impl JsonOutput {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        write!(file, "[")?;

        Ok(Self { file, first: true })
    }
}

#[async_trait]
impl OutputHandler for JsonOutput {
    async fn write(&mut self, row: &RenderedRow) -> Result<()> {
        if !self.first {
            write!(self.file, ",")?;
        } else {
            self.first = false;
        }

        let item = JsonRow {
            ordinal: row.ordinal,
            result: &row.result,
        };
        serde_json::to_writer(&mut self.file, &item)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        write!(self.file, "]")?;
        self.file.flush()?;
        Ok(())
    }
}
