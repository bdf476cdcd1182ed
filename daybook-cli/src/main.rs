mod commands;
mod context;
mod dates;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use daybook_core::export::ExportFormat;
use daybook_core::EventId;
use tracing_subscriber::EnvFilter;

use crate::commands::EventFields;
use crate::commands::month::MonthArg;
use crate::commands::theme::ThemeMode;
use crate::context::Context;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Browse months and manage timed events from the terminal")]
struct Cli {
    /// Read configuration from this file instead of ~/.config/daybook/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month grid (defaults to the current month)
    Month {
        /// Month to show: YYYY-MM, prev or next
        month: Option<MonthArg>,

        /// Only show events whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List the events on one day
    Day {
        /// Day to show (YYYY-MM-DD, "today", "next friday", ...)
        date: Option<String>,

        /// Only show events whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Create an event
    Add {
        /// Day of the event (defaults to today)
        date: Option<String>,

        #[command(flatten)]
        fields: EventFields,
    },
    /// Change an existing event
    Edit {
        /// Day the event is on
        date: String,

        /// Event id (shown by `daybook day`)
        id: EventId,

        /// Move the event to another day
        #[arg(long)]
        move_to: Option<String>,

        #[command(flatten)]
        fields: EventFields,
    },
    /// Delete an event
    Delete {
        /// Day the event is on
        date: String,

        /// Event id (shown by `daybook day`)
        id: EventId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Export every event to a file
    Export {
        /// json or ics
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Directory to write into (defaults to export_dir, then the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show or change the display theme
    Theme {
        #[arg(value_enum)]
        mode: Option<ThemeMode>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut ctx = Context::load(cli.config.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Month {
        month: None,
        search: None,
    });

    match command {
        Commands::Month { month, search } => commands::month::run(&ctx, month, search),
        Commands::Day { date, search } => commands::day::run(&ctx, date, search),
        Commands::Add { date, fields } => commands::add::run(&mut ctx, date, fields),
        Commands::Edit {
            date,
            id,
            move_to,
            fields,
        } => commands::edit::run(&mut ctx, date, id, move_to, fields),
        Commands::Delete { date, id, yes } => commands::delete::run(&mut ctx, date, id, yes),
        Commands::Export { format, out } => commands::export::run(&ctx, format, out),
        Commands::Theme { mode } => commands::theme::run(&mut ctx, mode),
    }
}

/// Warnings and above to stderr unless RUST_LOG says otherwise.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
