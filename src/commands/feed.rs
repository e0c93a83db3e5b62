use anyhow::Result;
use daybook_core::{Daybook, SourceAdded};
use owo_colors::OwoColorize;

use super::refresh_feeds;
use crate::render::Render;

pub async fn add(daybook: &Daybook, url: &str, refresh: bool) -> Result<()> {
    let added = daybook.feeds().add_source(url)?;

    match added {
        SourceAdded::Added => println!("{}", added.to_string().green()),
        SourceAdded::AlreadyPresent => println!("{}", added.to_string().dimmed()),
    }

    if refresh {
        let snapshot = refresh_feeds(daybook).await?;
        println!("{}", snapshot.status.render());
    }

    Ok(())
}

pub fn remove(daybook: &Daybook, url: &str) -> Result<()> {
    if !daybook.feeds().remove_source(url)? {
        anyhow::bail!("Feed '{}' is not configured", url.trim());
    }
    println!("{} {}", "Removed".red(), url.trim());
    Ok(())
}

pub fn list(daybook: &Daybook) -> Result<()> {
    let sources = daybook.feeds().sources();

    if sources.is_empty() {
        println!(
            "{}\n\nAdd one with:\n  daybook feed add <URL>",
            "No feeds configured.".dimmed()
        );
        return Ok(());
    }

    for (index, url) in sources.iter().enumerate() {
        println!("{} {}", format!("{index}.").dimmed(), url);
    }

    Ok(())
}

pub async fn refresh(daybook: &Daybook) -> Result<()> {
    let snapshot = refresh_feeds(daybook).await?;

    for report in &snapshot.sources {
        println!("   {}", report.render());
    }
    if !snapshot.sources.is_empty() {
        println!();
    }
    println!("{}", snapshot.status.render());

    Ok(())
}
