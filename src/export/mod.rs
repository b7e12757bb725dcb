pub mod csv;
pub mod json;
pub mod terminal;

use serde::Serialize;

use crate::list::{ListView, PageWindow};
use crate::record::Record;

pub const DEMO_BANNER: &str = "*** DEMO DATA: sample records, not live club data ***";

pub enum ExportFormat {
    Terminal,
    Json,
    Csv,
}

/// What a list command shows: the current page (or, for CSV, every
/// filtered record) plus enough context to tell live data from demo data.
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub screen: &'static str,
    pub title: &'static str,
    pub generated_at: String,
    pub is_demo: bool,
    pub error: Option<String>,
    pub query: &'a str,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub filtered_records: usize,
    pub window: PageWindow,
    pub records: Vec<&'a Record>,
}

impl<'a> Snapshot<'a> {
    /// The visible page.
    pub fn page(view: &'a ListView) -> Self {
        Self::build(view, view.visible_items())
    }

    /// Every record passing the filter.
    pub fn filtered(view: &'a ListView) -> Self {
        Self::build(view, view.filtered_items())
    }

    fn build(view: &'a ListView, records: Vec<&'a Record>) -> Self {
        let screen = view.screen();
        let error = match view.state() {
            crate::list::LoadState::Error(message) => Some(message.clone()),
            _ => None,
        };
        Self {
            screen: screen.id,
            title: screen.title,
            generated_at: chrono::Utc::now().to_rfc3339(),
            is_demo: view.is_demo(),
            error,
            query: view.query(),
            page: view.page(),
            total_pages: view.total_pages(),
            total_records: view.records().len(),
            filtered_records: view.filtered_len(),
            window: view.page_window(),
            records,
        }
    }

    pub fn render(&self, format: ExportFormat, columns: &[&str]) -> anyhow::Result<String> {
        match format {
            ExportFormat::Terminal => terminal::render(self, columns),
            ExportFormat::Json => json::render(self),
            ExportFormat::Csv => Ok(csv::render(&self.records)),
        }
    }
}
