pub mod add;
pub mod day;
pub mod delete;
pub mod edit;
pub mod export;
pub mod month;
pub mod theme;

use anyhow::Result;
use clap::Args;
use daybook_core::{Committed, DateKey, Event};
use dialoguer::Input;
use owo_colors::OwoColorize;

/// Event fields shared by `add` and `edit`.
#[derive(Args, Debug, Default, Clone)]
pub struct EventFields {
    /// Event title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Start time (HH:MM, 9am, 3:30pm)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End time (HH:MM, 5pm)
    #[arg(short, long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Length instead of an end time (e.g. 30m, 1h 30m)
    #[arg(short, long)]
    pub duration: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub description: Option<String>,

    /// Display color (#rrggbb)
    #[arg(short, long)]
    pub color: Option<String>,
}

impl EventFields {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.duration.is_none()
            && self.description.is_none()
            && self.color.is_none()
    }
}

/// Print the outcome of a mutation, warning when it never reached disk.
pub fn report(committed: &Committed<Event>, verb: &str, date_key: DateKey) {
    let event = &committed.value;
    println!(
        "{}",
        format!(
            "  {}: {} on {} ({}) #{}",
            verb,
            event.title,
            date_key,
            event.span(),
            event.id
        )
        .green()
    );

    if let Some(e) = &committed.persist_error {
        eprintln!(
            "{}",
            format!("  Warning: the change was not saved to disk: {}", e).yellow()
        );
    }
}

/// Prompt the user with retry on parse errors.
pub fn prompt_with_retry<T, F>(prompt: &str, parse: F) -> Result<T>
where
    F: Fn(&str) -> Result<T>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}
