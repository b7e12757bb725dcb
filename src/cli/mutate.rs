use serde_json::Value;

use super::{Context, fields_to_record, print_load_banner};
use crate::mutation::{self, Mutation, MutationOutcome};
use crate::screen::{self, Screen};

pub async fn create(
    ctx: &Context,
    screen_id: &str,
    fields: Vec<(String, Value)>,
) -> anyhow::Result<()> {
    let screen = screen::find(screen_id)?;
    let mutation = Mutation::create(screen, fields_to_record(fields));
    run(ctx, screen, &mutation).await
}

pub async fn update(
    ctx: &Context,
    screen_id: &str,
    id: &str,
    fields: Vec<(String, Value)>,
) -> anyhow::Result<()> {
    let screen = screen::find(screen_id)?;
    let mutation = Mutation::update(screen, id, fields_to_record(fields));
    run(ctx, screen, &mutation).await
}

pub async fn delete(ctx: &Context, screen_id: &str, id: &str) -> anyhow::Result<()> {
    let screen = screen::find(screen_id)?;
    let mutation = Mutation::delete(screen, id);
    run(ctx, screen, &mutation).await
}

pub async fn set_status(
    ctx: &Context,
    screen_id: &str,
    id: &str,
    status: &str,
) -> anyhow::Result<()> {
    let screen = screen::find(screen_id)?;
    let mutation = Mutation::set_status(screen, id, status);
    run(ctx, screen, &mutation).await
}

async fn run(ctx: &Context, screen: &'static Screen, mutation: &Mutation) -> anyhow::Result<()> {
    // Catch bad input before touching the network.
    ctx.session.require_admin()?;
    mutation.validate(screen)?;

    let (mut view, source) = ctx.load(screen).await?;

    let verb = mutation.action.verb();
    let outcome = mutation::submit(source.as_ref(), &mut view, &ctx.session, mutation)
        .await
        .and_then(MutationOutcome::into_result);

    match outcome {
        Ok(MutationOutcome::Confirmed) => {
            println!("{verb}: saved.");
        }
        Ok(_) => {
            println!(
                "{verb}: submitted, NOT confirmed. {} does not return a readable response; \
                 run `aperture list {}` to verify the change.",
                screen.title, screen.id
            );
        }
        Err(e) => {
            anyhow::bail!("ALERT: {verb} failed ({}): {e}", e.kind());
        }
    }

    print_load_banner(&view);
    println!("{} now has {} record(s).", screen.title, view.records().len());
    Ok(())
}
