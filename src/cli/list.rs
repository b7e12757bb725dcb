use super::{Context, print_load_banner};
use crate::export::{ExportFormat, Snapshot};
use crate::record::value_text;
use crate::screen;

pub async fn list(
    ctx: &Context,
    screen_id: &str,
    search: Option<&str>,
    page: usize,
    format: &str,
) -> anyhow::Result<()> {
    let screen = screen::find(screen_id)?;
    let (mut view, _source) = ctx.load(screen).await?;

    if let Some(q) = search {
        view.set_filter_query(q);
    }
    if page != 1 && !view.set_page(page) {
        eprintln!(
            "Page {page} is out of range (1-{}); showing page 1.",
            view.total_pages()
        );
    }

    let snapshot = Snapshot::page(&view);
    match format {
        "json" => println!("{}", snapshot.render(ExportFormat::Json, screen.columns)?),
        _ => print!("{}", snapshot.render(ExportFormat::Terminal, screen.columns)?),
    }
    Ok(())
}

pub async fn show(ctx: &Context, screen_id: &str, id: &str) -> anyhow::Result<()> {
    let screen = screen::find(screen_id)?;
    let (view, _source) = ctx.load(screen).await?;
    print_load_banner(&view);

    let record = view.record(id)?;
    let width = record.field_names().map(str::len).max().unwrap_or(0);
    for (name, value) in record.fields() {
        println!("{name:<width$}  {}", value_text(value));
    }
    Ok(())
}
