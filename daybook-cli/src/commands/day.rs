use anyhow::Result;

use crate::context::Context;
use crate::render;

pub fn run(ctx: &Context, date: Option<String>, search: Option<String>) -> Result<()> {
    let date_key = ctx.date(date.as_deref())?;
    let events = match &search {
        Some(term) => ctx.daybook.store().search(date_key, term),
        None => ctx.daybook.store().list_by_date(date_key),
    };

    println!(
        "{}",
        render::render_day(date_key, &events, ctx.today, ctx.daybook.theme())
    );

    Ok(())
}
