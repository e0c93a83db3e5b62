use anyhow::Result;
use daybook_core::Daybook;
use daybook_core::input::{parse_date, parse_time, parse_weekdays};
use owo_colors::OwoColorize;

use super::date_or_today;
use crate::render::Render;

pub fn add(
    daybook: &Daybook,
    title: &str,
    days: &str,
    time: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let days = parse_weekdays(days)?;
    let time = parse_time(time)?;
    let start = date_or_today(start)?;
    let end = end.map(parse_date).transpose()?;

    let routine = daybook.add_routine(title, days, time, start, end)?;

    println!("{}", "Created routine".green());
    println!("   {}", routine.render());

    Ok(())
}

pub fn list(daybook: &Daybook) -> Result<()> {
    let routines = daybook.routines();

    if routines.is_empty() {
        println!("{}", "No routines".dimmed());
        return Ok(());
    }

    for routine in &routines {
        println!("{}", routine.render());
    }

    Ok(())
}
