use super::OutputHandler;
use crate::error::Result;
use crate::render::escape::html_text;
use crate::render::{Cell, CellContent, HEADERS, RenderedRow};
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

const STYLE: &str = "body{font-family:sans-serif;margin:1.5rem}\
table{border-collapse:collapse;width:100%}\
th,td{border:1px solid #ccc;padding:4px 6px;text-align:left;vertical-align:top}\
.mono{font-family:monospace;word-break:break-all}\
.status-ok{color:#1a7f37}.status-error{color:#cf222e}\
.status-pending{color:#9a6700}.status-unknown{color:#57606a}";

/// Writes a standalone HTML report with the results table and status line.
pub struct HtmlOutput {
    file: File,
    body: String,
    status: Option<String>,
}

impl HtmlOutput {
    pub fn new(path: PathBuf) -> Result<Self> {
        Ok(Self {
            file: File::create(path)?,
            body: String::new(),
            status: None,
        })
    }

    fn push_cell(out: &mut String, cell: &Cell) {
        out.push_str("<td");
        if let Some(class) = cell.class {
            out.push_str(" class=\"");
            out.push_str(class.as_str());
            out.push('"');
        }
        if let Some(hint) = &cell.hint {
            out.push_str(" title=\"");
            out.push_str(&html_text(hint));
            out.push('"');
        }
        out.push('>');
        match &cell.content {
            CellContent::Text(text) => out.push_str(&html_text(text)),
            CellContent::Link { href, text } => {
                out.push_str("<a href=\"");
                out.push_str(&html_text(href));
                out.push_str("\" rel=\"noopener noreferrer\" target=\"_blank\">");
                out.push_str(&html_text(text));
                out.push_str("</a>");
            }
        }
        out.push_str("</td>");
    }

    pub fn document(&self) -> String {
        let mut doc = String::with_capacity(self.body.len() + 1024);
        doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        doc.push_str("<title>Scrape results</title>\n<style>");
        doc.push_str(STYLE);
        doc.push_str("</style>\n</head>\n<body>\n");
        doc.push_str(&format!(
            "<p class=\"generated\">Generated {}</p>\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        doc.push_str("<table id=\"results\">\n<thead><tr>");
        for header in HEADERS {
            doc.push_str("<th>");
            doc.push_str(&html_text(header));
            doc.push_str("</th>");
        }
        doc.push_str("</tr></thead>\n<tbody>\n");
        doc.push_str(&self.body);
        doc.push_str("</tbody>\n</table>\n<p id=\"status\">");
        if let Some(status) = &self.status {
            doc.push_str(&html_text(status));
        }
        doc.push_str("</p>\n</body>\n</html>\n");
        doc
    }
}

#[async_trait]
impl OutputHandler for HtmlOutput {
    async fn write(&mut self, row: &RenderedRow) -> Result<()> {
        self.body.push_str("<tr>");
        for cell in &row.cells {
            Self::push_cell(&mut self.body, cell);
        }
        self.body.push_str("</tr>\n");
        Ok(())
    }

    async fn status(&mut self, message: &str) -> Result<()> {
        self.status = Some(message.to_string());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let doc = self.document();
        self.file.write_all(doc.as_bytes())?;
        self.file.flush()?;
        Ok(())
    }
}
