use serde::Serialize;

/// Page buttons to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub pages: Vec<usize>,
    /// Window does not reach page 1: render "1 …" before it.
    pub leading_gap: bool,
    /// Window does not reach the last page: render "… last" after it.
    pub trailing_gap: bool,
    pub total_pages: usize,
}

/// Sliding window of `window` page numbers centered on `current`. On
/// overflow the window shifts left to end exactly at `total_pages`.
pub fn page_window(current: usize, total_pages: usize, window: usize) -> PageWindow {
    let total = total_pages.max(1);
    let window = window.clamp(1, total);
    let current = current.clamp(1, total);

    let mut start = current.saturating_sub(window / 2).max(1);
    let mut end = start + window - 1;
    if end > total {
        end = total;
        start = end + 1 - window;
    }

    PageWindow {
        pages: (start..=end).collect(),
        leading_gap: start > 1,
        trailing_gap: end < total,
        total_pages: total,
    }
}

impl PageWindow {
    /// One-line rendering, current page in brackets: `1 … 5 6 [7] 8 9 … 12`.
    pub fn render(&self, current: usize) -> String {
        let mut parts = Vec::new();
        let first = self.pages.first().copied().unwrap_or(1);
        let last = self.pages.last().copied().unwrap_or(self.total_pages);
        if self.leading_gap {
            parts.push("1".to_string());
            if first > 2 {
                parts.push("…".to_string());
            }
        }
        for &p in &self.pages {
            if p == current {
                parts.push(format!("[{p}]"));
            } else {
                parts.push(p.to_string());
            }
        }
        if self.trailing_gap {
            if last + 1 < self.total_pages {
                parts.push("…".to_string());
            }
            parts.push(self.total_pages.to_string());
        }
        parts.join(" ")
    }
}
