use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::record::{Record, value_text};

/// Quote a cell when it holds a comma, quote, CR or LF; inner quotes are
/// doubled.
pub fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header from the first record's field names, then one row per record.
pub fn render(records: &[&Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let columns: Vec<&str> = first.field_names().collect();

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| escape(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        let line = columns
            .iter()
            .map(|c| escape(&record.get(c).map(value_text).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `<dataset>_<YYYY-MM-DD>.csv`, with a `_DEMO` marker for sample data.
pub fn file_name(dataset: &str, date: NaiveDate, is_demo: bool) -> String {
    if is_demo {
        format!("{dataset}_DEMO_{}.csv", date.format("%Y-%m-%d"))
    } else {
        format!("{dataset}_{}.csv", date.format("%Y-%m-%d"))
    }
}

/// Mark a caller-chosen path as demo output: `out/report.csv` becomes
/// `out/report_DEMO.csv`. Already-marked names are left alone.
pub fn demo_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.contains("_DEMO") {
        return path.to_path_buf();
    }
    let name = match path.extension() {
        Some(ext) => format!("{stem}_DEMO.{}", ext.to_string_lossy()),
        None => format!("{stem}_DEMO"),
    };
    path.with_file_name(name)
}
