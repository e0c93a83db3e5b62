use anyhow::Result;
use daybook_core::Daybook;
use daybook_core::input::parse_optional_time;
use owo_colors::OwoColorize;

use super::date_or_today;

pub fn add(daybook: &Daybook, title: &str, date: Option<&str>, time: Option<&str>) -> Result<()> {
    let date = date_or_today(date)?;
    let time = parse_optional_time(time.unwrap_or_default())?;

    let event = daybook.add_event(title, date, time)?;

    let when = match event.time {
        Some(time) => format!("{} {}", event.date, time),
        None => event.date.to_string(),
    };
    println!("{} {} {}", "Created".green(), event.title.bold(), when.dimmed());
    println!("   {}", event.id.dimmed());

    Ok(())
}

pub fn delete(daybook: &Daybook, id: &str) -> Result<()> {
    let event = daybook.delete_event(id)?;
    println!("{} {}", "Deleted".red(), event.title.bold());
    Ok(())
}
