use std::path::PathBuf;

use anyhow::{Context as _, Result};
use daybook_core::export::ExportFormat;
use owo_colors::OwoColorize;

use crate::context::Context;

pub fn run(ctx: &Context, format: ExportFormat, out: Option<PathBuf>) -> Result<()> {
    let dir = out
        .or_else(|| ctx.config.export_path())
        .unwrap_or_else(|| PathBuf::from("."));

    let path = ctx
        .daybook
        .export_to_dir(format, &dir, ctx.today)
        .context("Failed to export events. Please try again.")?;

    let count = ctx.daybook.store().len();
    println!(
        "{}",
        format!(
            "  Exported {} {} to {}",
            count,
            if count == 1 { "event" } else { "events" },
            path.display()
        )
        .green()
    );

    Ok(())
}
