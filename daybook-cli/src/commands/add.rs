use anyhow::Result;
use daybook_core::{EventChange, EventDraft, PALETTE};
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;

use crate::commands::{EventFields, prompt_with_retry, report};
use crate::context::Context;
use crate::dates;
use crate::render;

pub fn run(ctx: &mut Context, date: Option<String>, fields: EventFields) -> Result<()> {
    let date_key = ctx.date(date.as_deref())?;
    let interactive = fields.title.is_none() || fields.start.is_none();

    if interactive {
        println!("{}", format!("  New event on {}", date_key).bold());
    }

    // --- Title ---
    let title = match fields.title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    };

    // --- Start ---
    let start = match fields.start {
        Some(s) => dates::parse_time(&s)?,
        None => prompt_with_retry("  Starts at?", dates::parse_time)?,
    };

    // --- End ---
    let end = if fields.end.is_some() || fields.duration.is_some() {
        dates::resolve_end(&start, fields.end.as_deref(), fields.duration.as_deref())?
    } else if interactive {
        prompt_end(&start)?
    } else {
        dates::resolve_end(&start, None, None)?
    };

    // --- Description ---
    let description = match fields.description {
        Some(d) => d,
        None if interactive => Input::new()
            .with_prompt("  Notes? (skip)")
            .default(String::new())
            .show_default(false)
            .interact_text()?,
        None => String::new(),
    };

    // --- Color ---
    let color = match fields.color {
        Some(c) => c,
        None if interactive => prompt_color(&ctx.config.default_color)?,
        None => ctx.config.default_color.clone(),
    };

    let draft = new_draft(title, start, end, description, color);

    let committed = ctx.daybook.upsert(date_key, EventChange::Create(draft))?;

    if interactive {
        println!();
    }
    report(&committed, "Created", date_key);

    Ok(())
}

fn new_draft(
    title: String,
    start: String,
    end: String,
    description: String,
    color: String,
) -> EventDraft {
    EventDraft::new(title, start, end)
        .with_description(description)
        .with_color(color)
}

/// The preset colors, with the configured default first when it isn't one
/// of them, and the index to preselect.
fn color_choices(default_color: &str) -> (Vec<String>, usize) {
    let mut choices: Vec<String> = PALETTE.iter().map(|c| c.to_string()).collect();
    match choices
        .iter()
        .position(|c| c.eq_ignore_ascii_case(default_color))
    {
        Some(index) => (choices, index),
        None => {
            choices.insert(0, default_color.to_string());
            (choices, 0)
        }
    }
}

fn picked_color(choices: &[String], selection: usize, default_color: &str) -> String {
    choices
        .get(selection)
        .cloned()
        .unwrap_or_else(|| default_color.to_string())
}

fn prompt_color(default_color: &str) -> Result<String> {
    let (choices, default) = color_choices(default_color);
    let items: Vec<String> = choices
        .iter()
        .map(|c| format!("{} {}", render::swatch(c), c))
        .collect();

    let selection = Select::new()
        .with_prompt("  Color")
        .items(&items)
        .default(default)
        .interact()?;

    Ok(picked_color(&choices, selection, default_color))
}

/// Prompt for an end time or a duration, defaulting to one hour.
fn prompt_end(start: &str) -> Result<String> {
    loop {
        let input: String = Input::new()
            .with_prompt("  Until? (time or duration, 1 hour)")
            .default(String::new())
            .show_default(false)
            .interact_text()?;
        let result = if input.trim().is_empty() {
            dates::resolve_end(start, None, None)
        } else {
            dates::parse_end_input(start, &input)
        };
        match result {
            Ok(end) => return Ok(end),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}
