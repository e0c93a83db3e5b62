use anyhow::Result;
use chrono::Local;
use daybook_core::Daybook;
use owo_colors::OwoColorize;
use tracing::debug;

use super::print_day;
use crate::render::Render;

pub async fn run(daybook: &Daybook) -> Result<()> {
    let handle = daybook.refresh_loop()?.spawn();
    let mut updates = handle.subscribe();

    println!("{}", "Watching feeds. Press Ctrl-C to stop.".dimmed());

    // The loop publishes whatever fetch is in flight, then closes the channel
    let cancel_token = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, stopping refresh loop");
            cancel_token.cancel();
        }
    });

    while updates.changed().await.is_ok() {
        let snapshot = updates.borrow_and_update().clone();
        let today = Local::now().date_naive();

        println!();
        print_day(today, &daybook.day(today));

        let refreshed = snapshot
            .completed_at
            .map(|at| format!("(refreshed {})", at.format("%H:%M")))
            .unwrap_or_default();
        println!("{} {}", snapshot.status.render(), refreshed.dimmed());
    }

    handle.stop().await;
    Ok(())
}
