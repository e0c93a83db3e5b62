pub mod day;
pub mod event;
pub mod feed;
pub mod month;
pub mod routine;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use daybook_core::feed::FeedSnapshot;
use daybook_core::input::parse_date;
use daybook_core::{Daybook, Occurrence};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::tui::create_spinner;

/// Run one fetch cycle behind a spinner.
pub async fn refresh_feeds(daybook: &Daybook) -> Result<Arc<FeedSnapshot>> {
    let timeout = daybook.config().fetch_timeout()?;

    let spinner = create_spinner("Fetching feeds");
    let snapshot = daybook.feeds().fetch_all(timeout).await;
    spinner.finish_and_clear();

    Ok(snapshot)
}

/// Parse an optional YYYY-MM-DD argument, defaulting to today.
pub fn date_or_today(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(date) => Ok(parse_date(date)?),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn print_day(date: NaiveDate, occurrences: &[Occurrence]) {
    println!("{}", date.format("%A, %B %-d %Y").bold());

    if occurrences.is_empty() {
        println!("   {}", "No events".dimmed());
        return;
    }

    for occurrence in occurrences {
        println!("   {}", occurrence.render().replace('\n', "\n   "));
    }
}
