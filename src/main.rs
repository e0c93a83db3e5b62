mod commands;
mod render;
mod utils;

use anyhow::Result;
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use daybook_core::{Daybook, MonthWindow};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "Your events, routines and subscribed calendars in one agenda")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every event in a month
    Month {
        #[arg(long)]
        year: Option<i32>,

        /// Month number (1-12)
        #[arg(long)]
        month: Option<u32>,

        /// Skip fetching feeds
        #[arg(long)]
        offline: bool,

        /// Print the month as JSON keyed by date
        #[arg(long)]
        json: bool,
    },
    /// Show the agenda for one day
    Day {
        /// Date (YYYY-MM-DD), defaults to today
        date: Option<String>,

        /// Skip fetching feeds
        #[arg(long)]
        offline: bool,
    },
    /// Manage manually created events
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },
    /// Manage weekly routines
    Routine {
        #[command(subcommand)]
        command: RoutineCommands,
    },
    /// Manage ICS feed subscriptions
    Feed {
        #[command(subcommand)]
        command: FeedCommands,
    },
    /// Keep feeds refreshed and print today's agenda after every refresh
    Watch,
}

#[derive(Subcommand)]
enum EventCommands {
    Add {
        title: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Time (HH:MM), omit for an all-day event
        #[arg(short, long)]
        time: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum RoutineCommands {
    Add {
        title: String,

        /// Weekdays, e.g. "mon,wed,fri" or "all"
        #[arg(long, default_value = "all")]
        days: String,

        /// Time (HH:MM)
        #[arg(short, long, default_value = "07:00")]
        time: String,

        /// First day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,

        /// Last day (YYYY-MM-DD), omit to repeat forever
        #[arg(long)]
        end: Option<String>,
    },
    List,
}

#[derive(Subcommand)]
enum FeedCommands {
    Add {
        url: String,

        /// Don't fetch feeds after adding
        #[arg(long)]
        no_refresh: bool,
    },
    Remove {
        url: String,
    },
    List,
    /// Fetch all feeds now and report per-feed results
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let daybook = Daybook::load()?;

    match cli.command {
        Commands::Month {
            year,
            month,
            offline,
            json,
        } => {
            let today = Local::now().date_naive();
            let window = MonthWindow::new(
                year.unwrap_or(today.year()),
                month.unwrap_or(today.month()),
            )?;
            commands::month::run(&daybook, window, offline, json).await
        }
        Commands::Day { date, offline } => {
            commands::day::run(&daybook, date.as_deref(), offline).await
        }
        Commands::Event { command } => match command {
            EventCommands::Add { title, date, time } => {
                commands::event::add(&daybook, &title, date.as_deref(), time.as_deref())
            }
            EventCommands::Delete { id } => commands::event::delete(&daybook, &id),
        },
        Commands::Routine { command } => match command {
            RoutineCommands::Add {
                title,
                days,
                time,
                start,
                end,
            } => commands::routine::add(
                &daybook,
                &title,
                &days,
                &time,
                start.as_deref(),
                end.as_deref(),
            ),
            RoutineCommands::List => commands::routine::list(&daybook),
        },
        Commands::Feed { command } => match command {
            FeedCommands::Add { url, no_refresh } => {
                commands::feed::add(&daybook, &url, !no_refresh).await
            }
            FeedCommands::Remove { url } => commands::feed::remove(&daybook, &url),
            FeedCommands::List => commands::feed::list(&daybook),
            FeedCommands::Refresh => commands::feed::refresh(&daybook).await,
        },
        Commands::Watch => commands::watch::run(&daybook).await,
    }
}
