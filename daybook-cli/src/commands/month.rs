use std::str::FromStr;

use anyhow::Result;
use daybook_core::{DateKey, MonthView};

use crate::context::Context;
use crate::render::{self, DayCell};

/// Which month to show: `prev`, `next` (relative to today's month) or `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthArg {
    Previous,
    Next,
    Exact(MonthView),
}

impl MonthArg {
    pub fn resolve(self, today: DateKey) -> MonthView {
        let current = MonthView::containing(today);
        match self {
            MonthArg::Previous => current.previous(),
            MonthArg::Next => current.next(),
            MonthArg::Exact(view) => view,
        }
    }
}

impl FromStr for MonthArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prev" | "previous" | "last" => Ok(MonthArg::Previous),
            "next" => Ok(MonthArg::Next),
            other => other
                .parse::<MonthView>()
                .map(MonthArg::Exact)
                .map_err(|_| format!("Unknown month '{}'. Expected YYYY-MM, prev or next", s)),
        }
    }
}

pub fn run(ctx: &Context, month: Option<MonthArg>, search: Option<String>) -> Result<()> {
    let view = match month {
        Some(arg) => arg.resolve(ctx.today),
        None => MonthView::containing(ctx.today),
    };
    let store = ctx.daybook.store();
    let term = search.as_deref().unwrap_or("");

    let cells: Vec<DayCell> = view
        .days()
        .map(|date| DayCell {
            date,
            events: store.search(date, term),
        })
        .filter(|cell| !cell.events.is_empty())
        .collect();

    let label = match &search {
        Some(term) => format!("{}, matching \"{}\"", ctx.zone, term),
        None => ctx.zone.to_string(),
    };

    println!(
        "{}",
        render::render_month(&view, &cells, ctx.today, ctx.daybook.theme(), &label)
    );

    Ok(())
}
