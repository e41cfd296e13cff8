use super::OutputHandler;
use crate::error::{Error, Result};
use crate::render::escape::terminal_text;
use crate::render::{HEADERS, RenderedRow};
use async_trait::async_trait;
use indicatif::MultiProgress;
use std::sync::Arc;
use tabled::{builder::Builder, settings::Style};

/// Prints the table to stdout once all rows are in, so columns line up.
pub struct ConsoleOutput {
    multi: Option<Arc<MultiProgress>>,
    rows: Vec<Vec<String>>,
    status: Option<String>,
}

impl ConsoleOutput {
    pub fn new(multi: Option<Arc<MultiProgress>>) -> Self {
        Self {
            multi,
            rows: Vec::new(),
            status: None,
        }
    }

    pub fn render(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(HEADERS.iter().map(|h| h.to_string()));
        for row in &self.rows {
            builder.push_record(row.iter().cloned());
        }

        let mut table = builder.build();
        table.with(Style::modern());

        let mut output = table.to_string();
        if let Some(status) = &self.status {
            output.push('\n');
            output.push_str(status);
        }
        output
    }

    fn print(&self, output: &str) -> Result<()> {
        if let Some(multi) = &self.multi {
            for line in output.lines() {
                multi
                    .println(line)
                    .map_err(|e| Error::Internal(e.to_string()))?;
            }
        } else {
            for line in output.lines() {
                println!("{}", line);
            }
        }
        Ok(())
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl OutputHandler for ConsoleOutput {
    async fn write(&mut self, row: &RenderedRow) -> Result<()> {
        self.rows.push(
            row.cells
                .iter()
                .map(|c| terminal_text(c.display_text()).into_owned())
                .collect(),
        );
        Ok(())
    }

    async fn status(&mut self, message: &str) -> Result<()> {
        self.status = Some(terminal_text(message).into_owned());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let output = self.render();
        self.print(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScrapeResult;
    use crate::render::render_row;

    #[tokio::test]
    async fn strips_terminal_escapes_from_cells() {
        let mut out = ConsoleOutput::default();
        let result = ScrapeResult {
            title: Some("\u{1b}[2Jwiped".into()),
            ..ScrapeResult::pending("https://vk.com/video1")
        };
        out.write(&render_row(&result, 0)).await.unwrap();
        out.status("Done. 1 URL(s).").await.unwrap();

        let rendered = out.render();
        assert!(!rendered.contains('\u{1b}'));
        assert!(rendered.contains("\u{FFFD}[2Jwiped"));
        assert!(rendered.contains("https://vk.com/video1"));
        assert!(rendered.contains("Input URL"));
        assert!(rendered.ends_with("Done. 1 URL(s)."));
    }
}
