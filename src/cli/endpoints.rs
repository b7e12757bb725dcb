use comfy_table::{Cell, Table};

use super::Context;
use crate::screen::{SCREENS, Transport};

pub fn list_endpoints(ctx: &Context) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Screen", "Title", "Endpoint", "Writes", "Admin", "URL"]);

    for s in SCREENS {
        let url = ctx.config.endpoint_url(s.endpoint).unwrap_or("(not configured)");
        let writes = match s.transport {
            Transport::Form => "form",
            Transport::Multipart => "multipart",
            Transport::FireAndForget => "unconfirmed",
        };
        table.add_row(vec![
            Cell::new(s.id),
            Cell::new(s.title),
            Cell::new(s.endpoint),
            Cell::new(writes),
            Cell::new(if s.admin_only { "yes" } else { "-" }),
            Cell::new(url),
        ]);
    }

    println!("{table}");
    match &ctx.config.relay_url {
        Some(relay) => println!("Read relay:  {relay}"),
        None => println!("Read relay:  none"),
    }
    match ctx.session.identity() {
        Some(id) if ctx.session.is_admin() => println!("Signed in:   {} (admin)", id.email),
        Some(id) => println!("Signed in:   {}", id.email),
        None => println!("Signed in:   no (pass --as <email> for admin screens)"),
    }
    Ok(())
}
