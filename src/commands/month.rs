use anyhow::Result;
use daybook_core::{Daybook, MonthWindow};
use owo_colors::OwoColorize;

use super::refresh_feeds;
use crate::render::{Render, pluralize};

pub async fn run(daybook: &Daybook, window: MonthWindow, offline: bool, json: bool) -> Result<()> {
    let status = if offline {
        None
    } else {
        Some(refresh_feeds(daybook).await?.status)
    };

    let index = daybook.month(window);

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    let total: usize = index.iter().map(|(_, occurrences)| occurrences.len()).sum();
    println!(
        "{} {}",
        window.to_string().bold(),
        format!("({total} {})", pluralize("event", total)).dimmed()
    );

    for (_, occurrences) in index.iter() {
        let Some(first) = occurrences.first() else {
            continue;
        };
        println!();
        println!("{}", first.date.format("%a %-d").bold());
        for occurrence in occurrences {
            println!("   {}", occurrence.render().replace('\n', "\n   "));
        }
    }

    if let Some(status) = status {
        println!();
        println!("{}", status.render());
    }

    Ok(())
}
