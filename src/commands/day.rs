use anyhow::Result;
use daybook_core::Daybook;

use super::{date_or_today, print_day, refresh_feeds};
use crate::render::Render;

pub async fn run(daybook: &Daybook, date: Option<&str>, offline: bool) -> Result<()> {
    let date = date_or_today(date)?;

    let status = if offline {
        None
    } else {
        Some(refresh_feeds(daybook).await?.status)
    };

    print_day(date, &daybook.day(date));

    if let Some(status) = status {
        println!();
        println!("{}", status.render());
    }

    Ok(())
}
