use comfy_table::{Cell, Table};

use super::{DEMO_BANNER, Snapshot};
use crate::record::value_text;

pub fn render(snapshot: &Snapshot, columns: &[&str]) -> anyhow::Result<String> {
    let mut output = String::new();

    output.push_str(&format!("=== {} ===\n", snapshot.title));
    if snapshot.is_demo {
        output.push_str(DEMO_BANNER);
        output.push('\n');
    }
    if let Some(error) = &snapshot.error {
        output.push_str(&format!(
            "Error loading {}: {error}. Run the command again to retry.\n",
            snapshot.screen
        ));
    }
    if !snapshot.query.is_empty() {
        output.push_str(&format!(
            "Search \"{}\": {} of {} record(s)\n",
            snapshot.query, snapshot.filtered_records, snapshot.total_records
        ));
    }

    if snapshot.records.is_empty() {
        output.push_str("No records.\n");
        return Ok(output);
    }

    let mut table = Table::new();
    table.set_header(columns.to_vec());
    for r in &snapshot.records {
        table.add_row(
            columns
                .iter()
                .map(|c| {
                    let text = r.get(c).map(value_text).unwrap_or_default();
                    Cell::new(if text.is_empty() { "-".to_string() } else { text })
                })
                .collect::<Vec<_>>(),
        );
    }
    output.push_str(&table.to_string());
    output.push('\n');

    output.push_str(&format!(
        "Page {} of {}   {}\n",
        snapshot.page,
        snapshot.total_pages,
        snapshot.window.render(snapshot.page)
    ));

    Ok(output)
}
