use std::path::Path;

use super::{Context, print_load_banner};
use crate::export::{ExportFormat, Snapshot, csv};
use crate::screen;

pub async fn export_csv(
    ctx: &Context,
    screen_id: &str,
    search: Option<&str>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let screen = screen::find(screen_id)?;
    let (mut view, _source) = ctx.load(screen).await?;
    print_load_banner(&view);

    if let Some(q) = search {
        view.set_filter_query(q);
    }
    if view.filtered_len() == 0 {
        println!("Nothing to export.");
        return Ok(());
    }

    let snapshot = Snapshot::filtered(&view);
    let rendered = snapshot.render(ExportFormat::Csv, screen.columns)?;

    let path = match output {
        Some(p) if view.is_demo() => {
            let marked = csv::demo_path(p);
            tracing::warn!("Writing demo records to {}", marked.display());
            marked
        }
        Some(p) => p.to_path_buf(),
        None => csv::file_name(
            screen.dataset(),
            chrono::Local::now().date_naive(),
            view.is_demo(),
        )
        .into(),
    };
    std::fs::write(&path, rendered)?;
    println!(
        "Exported {} record(s) to {}",
        view.filtered_len(),
        path.display()
    );
    Ok(())
}
