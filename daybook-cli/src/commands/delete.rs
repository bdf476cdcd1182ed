use anyhow::Result;
use daybook_core::EventId;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::commands::report;
use crate::context::Context;
use crate::render::Render;

pub fn run(ctx: &mut Context, date: String, id: EventId, yes: bool) -> Result<()> {
    let date_key = ctx.date(Some(date.as_str()))?;
    let event = ctx.event_on(date_key, id)?;

    // Confirm unless --yes
    if !yes {
        println!("  {}", event.render());
        let confirmed = Confirm::new()
            .with_prompt("Are you sure you want to delete this event?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "  Kept".dimmed());
            return Ok(());
        }
    }

    let committed = ctx.daybook.delete(date_key, id)?;
    report(&committed, "Deleted", date_key);

    Ok(())
}
