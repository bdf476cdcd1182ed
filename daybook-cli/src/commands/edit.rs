use anyhow::{Result, bail};
use daybook_core::{Event, EventChange, EventDraft, EventId, TimeOfDay};

use crate::commands::{EventFields, report};
use crate::context::Context;
use crate::dates;

pub fn run(
    ctx: &mut Context,
    date: String,
    id: EventId,
    move_to: Option<String>,
    fields: EventFields,
) -> Result<()> {
    let date_key = ctx.date(Some(date.as_str()))?;
    let event = ctx.event_on(date_key, id)?;

    let target = match move_to {
        Some(day) => ctx.date(Some(day.as_str()))?,
        None => date_key,
    };

    if fields.is_empty() && target == date_key {
        bail!("Nothing to change. Pass a field such as --title or --start, or --move-to");
    }

    let draft = apply_fields(&event, &fields)?;
    let committed = ctx.daybook.upsert(target, EventChange::Update(id, draft))?;

    let verb = if target == date_key { "Updated" } else { "Moved" };
    report(&committed, verb, target);

    Ok(())
}

/// The edit form for `event` with the given fields filled in.
///
/// Moving only the start keeps the event's length.
fn apply_fields(event: &Event, fields: &EventFields) -> Result<EventDraft> {
    let mut draft = EventDraft::from_event(event);

    if let Some(title) = &fields.title {
        draft.title = title.clone();
    }

    if let Some(start) = &fields.start {
        draft.start_time = dates::parse_time(start)?;
    }

    if fields.end.is_some() || fields.duration.is_some() {
        draft.end_time = dates::resolve_end(
            &draft.start_time,
            fields.end.as_deref(),
            fields.duration.as_deref(),
        )?;
    } else if fields.start.is_some() {
        let start: TimeOfDay = draft.start_time.parse()?;
        let length = event.end_time.as_naive() - event.start_time.as_naive();
        draft.end_time = dates::end_after(start, length)?;
    }

    if let Some(description) = &fields.description {
        draft.description = description.clone();
    }

    if let Some(color) = &fields.color {
        draft.color = color.clone();
    }

    Ok(draft)
}
