use crate::model::{PENDING, PLACEHOLDER, ScrapeResult, Status};
use url::Url;

pub const HEADERS: [&str; 11] = [
    "#",
    "Input URL",
    "Title",
    "Duration (s)",
    "Duration",
    "Views",
    "Upload Date",
    "Channel URL",
    "Channel Name",
    "Subscribers",
    "Status",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    Link { href: String, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellClass {
    Mono,
    StatusOk,
    StatusError,
    StatusPending,
    StatusUnknown,
}

impl CellClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellClass::Mono => "mono",
            CellClass::StatusOk => "status-ok",
            CellClass::StatusError => "status-error",
            CellClass::StatusPending => "status-pending",
            CellClass::StatusUnknown => "status-unknown",
        }
    }
}

/// One table cell. Content is always raw text; sinks escape it on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub content: CellContent,
    pub class: Option<CellClass>,
    /// Auxiliary detail, shown as a tooltip where the sink supports one.
    pub hint: Option<String>,
}

impl Cell {
    fn text(s: impl Into<String>) -> Self {
        Self {
            content: CellContent::Text(s.into()),
            class: None,
            hint: None,
        }
    }

    fn with_class(mut self, class: CellClass) -> Self {
        self.class = Some(class);
        self
    }

    /// The visible text of the cell.
    pub fn display_text(&self) -> &str {
        match &self.content {
            CellContent::Text(s) => s,
            CellContent::Link { text, .. } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    /// 1-based position in the response.
    pub ordinal: usize,
    pub status: Status,
    pub cells: Vec<Cell>,
    pub result: ScrapeResult,
}

/// Renders `result`, found at zero-based `index` in the response, as one row.
pub fn render_row(result: &ScrapeResult, index: usize) -> RenderedRow {
    let placeholder = if result.status == Status::Fetching {
        PENDING
    } else {
        PLACEHOLDER
    };
    let text = |v: Option<&str>| Cell::text(v.unwrap_or(placeholder));
    let count = |v: Option<u64>| Cell::text(v.map_or_else(|| placeholder.to_string(), |n| n.to_string()));

    let input_url = if result.input_url.trim().is_empty() {
        placeholder
    } else {
        result.input_url.as_str()
    };

    let cells = vec![
        Cell::text((index + 1).to_string()),
        Cell::text(input_url).with_class(CellClass::Mono),
        text(result.title.as_deref()),
        count(result.duration_seconds),
        text(result.duration_text().as_deref()),
        count(result.views),
        text(result.upload_date.as_deref()),
        channel_cell(result.channel_url.as_deref(), placeholder),
        text(result.channel_name.as_deref()),
        count(result.subscribers),
        status_cell(result),
    ];

    RenderedRow {
        ordinal: index + 1,
        status: result.status,
        cells,
        result: result.clone(),
    }
}

fn channel_cell(channel_url: Option<&str>, placeholder: &str) -> Cell {
    match channel_url {
        Some(raw) if linkable(raw) => Cell {
            content: CellContent::Link {
                href: raw.trim().to_string(),
                text: raw.to_string(),
            },
            class: None,
            hint: None,
        },
        Some(raw) => Cell::text(raw),
        None => Cell::text(placeholder),
    }
}

// Only absolute web URLs become links; `javascript:` and friends stay text.
fn linkable(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

fn status_cell(result: &ScrapeResult) -> Cell {
    let class = match result.status {
        Status::Success => CellClass::StatusOk,
        Status::Error => CellClass::StatusError,
        Status::Fetching => CellClass::StatusPending,
        Status::Unknown => CellClass::StatusUnknown,
    };
    let text = match &result.error {
        Some(err) => format!("{} - {}", result.status.as_str(), err),
        None => result.status.as_str().to_string(),
    };
    Cell {
        content: CellContent::Text(text),
        class: Some(class),
        hint: result.error.clone(),
    }
}
