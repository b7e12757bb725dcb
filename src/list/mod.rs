pub mod pagination;

use std::ops::Range;

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::record::{self, Record};
use crate::remote::{self, CollectionSource, demo};
use crate::screen::Screen;

pub use pagination::{PageWindow, page_window};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    /// Last load failed; a manual retry goes back to `Loading`.
    Error(String),
}

/// Issued by `begin_load`, handed back to `finish_load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Local patch applied right after a mutation is acknowledged, before the
/// refetch replaces the list.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEffect {
    None,
    Remove(String),
    SetStatus { id: String, status: String },
    Patch { id: String, fields: Record },
}

/// Indices of records matching `query`: case-insensitive substring, OR
/// over `fields`. The empty query matches everything.
pub fn filter_indices(records: &[Record], fields: &[&str], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches_query(r, fields, &needle))
        .map(|(i, _)| i)
        .collect()
}

fn matches_query(record: &Record, fields: &[&str], needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|f| match record.get(f) {
        Some(Value::Array(items)) => items
            .iter()
            .any(|v| record::value_text(v).to_lowercase().contains(needle)),
        Some(v) => record::value_text(v).to_lowercase().contains(needle),
        None => false,
    })
}

/// Number of pages for `count` items; never less than 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Index range of `page` (1-indexed); empty past the last page.
pub fn visible_range(count: usize, page: usize, page_size: usize) -> Range<usize> {
    if page == 0 {
        return 0..0;
    }
    let start = (page - 1).saturating_mul(page_size).min(count);
    let end = page.saturating_mul(page_size).min(count);
    start..end
}

/// The in-memory mirror of one screen's collection plus its filter and
/// page state.
pub struct ListView {
    screen: &'static Screen,
    records: Vec<Record>,
    query: String,
    filtered: Vec<usize>,
    page: usize,
    page_size: usize,
    window: usize,
    state: LoadState,
    is_demo: bool,
    /// A live load has succeeded at least once.
    has_live: bool,
    issued: u64,
    detached: bool,
}

impl ListView {
    pub fn new(screen: &'static Screen, page_size: usize, window: usize) -> Self {
        Self {
            screen,
            records: Vec::new(),
            query: String::new(),
            filtered: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            window: window.max(1),
            state: LoadState::Idle,
            is_demo: false,
            has_live: false,
            issued: 0,
            detached: false,
        }
    }

    pub fn screen(&self) -> &'static Screen {
        self.screen
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Records shown are sample data, not live.
    pub fn is_demo(&self) -> bool {
        self.is_demo
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.issued)
    }

    /// Apply a load result. Returns false when the result was discarded
    /// because the view was detached.
    ///
    /// Overlapping loads are not serialized: whichever result arrives last
    /// replaces the list.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: AppResult<Vec<Record>>) -> bool {
        if self.detached {
            tracing::debug!("Discarding load for detached {} view", self.screen.id);
            return false;
        }
        if ticket.0 < self.issued {
            tracing::trace!(
                "Load #{} finished after #{} was issued; applying anyway",
                ticket.0,
                self.issued
            );
        }

        match result {
            Ok(records) => {
                self.records = records;
                self.is_demo = false;
                self.has_live = true;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!("Loading {} failed: {e}", self.screen.id);
                // Only a view that never held live data falls back. An empty
                // list after deleting the last record stays empty.
                if !self.has_live
                    && let Some(mut sample) = demo::dataset(self.screen.id)
                {
                    record::sort_newest_first(&mut sample, self.screen.timestamp_fields);
                    self.records = sample;
                    self.is_demo = true;
                }
                self.state = LoadState::Error(e.to_string());
            }
        }
        self.recompute();
        true
    }

    /// Fetch from `source` and apply the result.
    pub async fn refresh(&mut self, source: &dyn CollectionSource) -> bool {
        let ticket = self.begin_load();
        let result = remote::fetch_collection(source, self.screen, &[]).await;
        let applied = self.finish_load(ticket, result);
        if applied && source.is_demo() {
            self.is_demo = true;
        }
        applied
    }

    /// Stop accepting load results (the screen went away).
    pub fn detach(&mut self) {
        self.detached = true;
    }

    pub fn set_filter_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.page = 1;
        self.recompute();
    }

    /// Move to page `n`; out of range is a no-op.
    pub fn set_page(&mut self, n: usize) -> bool {
        if n >= 1 && n <= self.total_pages() {
            self.page = n;
            true
        } else {
            false
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered.len(), self.page_size)
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered_items(&self) -> Vec<&Record> {
        self.filtered.iter().map(|&i| &self.records[i]).collect()
    }

    pub fn visible_items(&self) -> Vec<&Record> {
        let range = visible_range(self.filtered.len(), self.page, self.page_size);
        self.filtered[range]
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn page_window(&self) -> PageWindow {
        page_window(self.page, self.total_pages(), self.window)
    }

    pub fn record_id(&self, record: &Record) -> Option<String> {
        record.text(self.screen.id_field)
    }

    pub fn record(&self, id: &str) -> AppResult<&Record> {
        self.records
            .iter()
            .find(|r| self.record_id(r).as_deref() == Some(id))
            .ok_or_else(|| AppError::RecordNotFound(format!("{} in {}", id, self.screen.id)))
    }

    pub fn apply_acknowledged(&mut self, effect: &LocalEffect) {
        let id_field = self.screen.id_field;
        let position = |records: &[Record], id: &str| {
            records
                .iter()
                .position(|r| r.text(id_field).as_deref() == Some(id))
        };

        match effect {
            LocalEffect::None => return,
            LocalEffect::Remove(id) => {
                if let Some(i) = position(&self.records, id) {
                    self.records.remove(i);
                }
            }
            LocalEffect::SetStatus { id, status } => {
                if let (Some(i), Some(field)) =
                    (position(&self.records, id), self.screen.status_field)
                {
                    self.records[i].set(field, Value::String(status.clone()));
                }
            }
            LocalEffect::Patch { id, fields } => {
                if let Some(i) = position(&self.records, id) {
                    self.records[i].merge(fields);
                }
            }
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = filter_indices(&self.records, self.screen.searchable_fields, &self.query);
        self.page = self.page.clamp(1, self.total_pages());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen;
    use serde_json::json;

    fn posts(n: usize) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                let author = if i % 2 == 0 { "Even Author" } else { "Odd Author" };
                let tags = if i % 3 == 0 {
                    json!(["Macro", "nature"])
                } else {
                    json!([])
                };
                Record::from_value(json!({
                    "id": i.to_string(),
                    "title": format!("Post {i}"),
                    "author": author,
                    "tags": tags,
                    "date": format!("2025-01-{:02}", (i % 28) + 1),
                    "status": "draft",
                }))
                .unwrap()
            })
            .collect()
    }

    fn loaded(n: usize) -> ListView {
        let mut view = ListView::new(screen::find("blog").unwrap(), 10, 5);
        let ticket = view.begin_load();
        assert!(view.finish_load(ticket, Ok(posts(n))));
        view
    }

    fn filter_records<'a>(records: &'a [Record], fields: &[&str], query: &str) -> Vec<&'a Record> {
        filter_indices(records, fields, query)
            .into_iter()
            .map(|i| &records[i])
            .collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let records = posts(7);
        let fields = ["title", "author"];
        assert_eq!(filter_records(&records, &fields, "").len(), records.len());
    }

    #[test]
    fn test_filter_sound_and_complete() {
        let records = posts(30);
        let fields = ["title", "author", "tags"];
        for q in ["even", "POST 1", "macro", "zzz", "o"] {
            let hits = filter_records(&records, &fields, q);
            let lower = q.to_lowercase();
            let contains = |r: &Record| {
                fields.iter().any(|f| {
                    r.get(f)
                        .map(|v| record::value_text(v).to_lowercase().contains(&lower))
                        .unwrap_or(false)
                })
            };
            assert!(hits.iter().all(|r| contains(r)), "{q}");
            let expected = records.iter().filter(|r| contains(r)).count();
            assert_eq!(hits.len(), expected, "{q}");
        }
    }

    #[test]
    fn test_array_fields_match_elements() {
        let records = posts(9);
        let hits = filter_records(&records, &["tags"], "nature");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_visible_range_formula() {
        let size = 10;
        for count in [0usize, 1, 9, 10, 11, 25, 40] {
            let pages = total_pages(count, size);
            for page in 1..=pages + 2 {
                let len = visible_range(count, page, size).len();
                if page > pages {
                    assert_eq!(len, 0);
                } else {
                    let remaining = count.saturating_sub((page - 1) * size);
                    assert_eq!(len, size.min(remaining));
                }
            }
        }
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(21, 10), 3);
    }

    #[test]
    fn test_visible_items_per_page() {
        let mut view = loaded(25);
        assert_eq!(view.total_pages(), 3);
        assert_eq!(view.visible_items().len(), 10);
        assert!(view.set_page(3));
        assert_eq!(view.visible_items().len(), 5);
    }

    #[test]
    fn test_set_page_out_of_range_is_noop() {
        let mut view = loaded(25);
        assert!(view.set_page(2));
        assert!(!view.set_page(0));
        assert!(!view.set_page(4));
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn test_filter_resets_page() {
        let mut view = loaded(25);
        view.set_page(3);
        view.set_filter_query("post");
        assert_eq!(view.page(), 1);
        view.set_page(2);
        view.set_filter_query("");
        assert_eq!(view.page(), 1);
        assert_eq!(view.filtered_len(), 25);
    }

    #[test]
    fn test_page_clamped_after_reload_shrinks_list() {
        let mut view = loaded(25);
        view.set_page(3);
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(posts(4)));
        assert_eq!(view.page(), 1);
        assert_eq!(view.total_pages(), 1);
    }

    #[test]
    fn test_state_transitions() {
        let mut view = ListView::new(screen::find("results").unwrap(), 10, 5);
        assert_eq!(view.state(), &LoadState::Idle);
        let ticket = view.begin_load();
        assert_eq!(view.state(), &LoadState::Loading);
        view.finish_load(ticket, Err(AppError::Transport("offline".into())));
        assert!(matches!(view.state(), LoadState::Error(_)));
        // Results have no demo dataset.
        assert!(!view.is_demo());
        assert!(view.records().is_empty());

        let ticket = view.begin_load();
        assert_eq!(view.state(), &LoadState::Loading);
        view.finish_load(ticket, Ok(vec![]));
        assert_eq!(view.state(), &LoadState::Ready);
    }

    #[test]
    fn test_demo_fallback_only_when_empty() {
        let mut view = ListView::new(screen::find("blog").unwrap(), 10, 5);
        let ticket = view.begin_load();
        view.finish_load(ticket, Err(AppError::Transport("offline".into())));
        assert!(view.is_demo());
        assert!(!view.records().is_empty());

        let mut live = loaded(3);
        let ticket = live.begin_load();
        live.finish_load(ticket, Err(AppError::Transport("offline".into())));
        assert!(!live.is_demo());
        assert_eq!(live.records().len(), 3);

        // A successful reload clears the demo marker.
        let ticket = view.begin_load();
        view.finish_load(ticket, Ok(posts(2)));
        assert!(!view.is_demo());
    }

    #[test]
    fn test_no_demo_fallback_after_live_list_emptied() {
        let mut view = loaded(1);
        view.apply_acknowledged(&LocalEffect::Remove("1".into()));
        assert!(view.records().is_empty());

        let ticket = view.begin_load();
        view.finish_load(ticket, Err(AppError::Transport("down".into())));
        assert!(matches!(view.state(), LoadState::Error(_)));
        assert!(!view.is_demo());
        assert!(view.records().is_empty());

        // A live but empty collection also counts as prior data.
        let mut empty = ListView::new(screen::find("blog").unwrap(), 10, 5);
        let ticket = empty.begin_load();
        empty.finish_load(ticket, Ok(vec![]));
        let ticket = empty.begin_load();
        empty.finish_load(ticket, Err(AppError::Transport("down".into())));
        assert!(!empty.is_demo());
    }

    #[test]
    fn test_last_response_wins_and_detach_discards() {
        let mut view = ListView::new(screen::find("blog").unwrap(), 10, 5);
        let first = view.begin_load();
        let second = view.begin_load();
        view.finish_load(second, Ok(posts(5)));
        view.finish_load(first, Ok(posts(2)));
        assert_eq!(view.records().len(), 2);

        view.detach();
        let third = view.begin_load();
        assert!(!view.finish_load(third, Ok(posts(9))));
        assert_eq!(view.records().len(), 2);
    }

    #[test]
    fn test_apply_acknowledged() {
        let mut view = loaded(12);
        view.apply_acknowledged(&LocalEffect::Remove("3".into()));
        assert_eq!(view.filtered_len(), 11);
        assert!(view.record("3").is_err());

        view.apply_acknowledged(&LocalEffect::SetStatus {
            id: "4".into(),
            status: "published".into(),
        });
        assert_eq!(
            view.record("4").unwrap().text("status").as_deref(),
            Some("published")
        );

        let mut fields = Record::new();
        fields.set("title", json!("Renamed"));
        view.apply_acknowledged(&LocalEffect::Patch {
            id: "5".into(),
            fields,
        });
        assert_eq!(
            view.record("5").unwrap().text("title").as_deref(),
            Some("Renamed")
        );
    }

    #[tokio::test]
    async fn test_refresh_from_demo_source_is_marked() {
        let mut view = ListView::new(screen::find("gallery").unwrap(), 10, 5);
        assert!(view.refresh(&remote::demo::DemoSource).await);
        assert_eq!(view.state(), &LoadState::Ready);
        assert!(view.is_demo());
    }
}
