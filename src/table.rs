use crate::model::ScrapeResult;
use crate::render::{RenderedRow, render_row};

/// The results table a submission renders into.
///
/// Rows only ever get appended or cleared wholesale; a submission replaces the
/// full contents.
#[derive(Debug, Default, Clone)]
pub struct ResultsTable {
    rows: Vec<RenderedRow>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `result` at zero-based `index` and appends it.
    pub fn append(&mut self, result: &ScrapeResult, index: usize) {
        self.rows.push(render_row(result, index));
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn rows(&self) -> &[RenderedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
