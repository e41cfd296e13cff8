use crate::error::Result;
use crate::render::RenderedRow;
use crate::table::ResultsTable;
use async_trait::async_trait;

pub mod console;
pub mod csv;
pub mod html;
pub mod json;
pub mod sqlite;

/// A destination for a finished results table.
#[async_trait]
pub trait OutputHandler: Send + Sync {
    async fn write(&mut self, row: &RenderedRow) -> Result<()>;

    /// Records the submission's status line ("Done. 3 URL(s).", "Error: ...").
    async fn status(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes every row of `table`, then the status line, then closes `handler`.
pub async fn publish(
    handler: &mut dyn OutputHandler,
    table: &ResultsTable,
    message: &str,
) -> Result<()> {
    for row in table.rows() {
        handler.write(row).await?;
    }
    handler.status(message).await?;
    handler.close().await
}
