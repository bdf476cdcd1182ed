use anyhow::Result;
use clap::ValueEnum;
use daybook_core::Theme;

use crate::context::Context;
use crate::render::Render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
    Light,
    Dark,
    /// Switch to the other theme
    Toggle,
}

pub fn run(ctx: &mut Context, mode: Option<ThemeMode>) -> Result<()> {
    let theme = match mode {
        None => ctx.daybook.theme(),
        Some(ThemeMode::Toggle) => ctx.daybook.toggle_theme()?,
        Some(ThemeMode::Light) => set(ctx, Theme::Light)?,
        Some(ThemeMode::Dark) => set(ctx, Theme::Dark)?,
    };

    println!("  {}", theme.render());
    Ok(())
}

fn set(ctx: &mut Context, theme: Theme) -> Result<Theme> {
    ctx.daybook.set_theme(theme)?;
    Ok(theme)
}
