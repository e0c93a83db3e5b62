//! Colored terminal rendering for daybook-core types.

use daybook_core::feed::{SourceOutcome, SourceReport};
use daybook_core::{FeedStatus, Occurrence, Routine, Source};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Source {
    fn render(&self) -> String {
        let label = format!("[{}]", self.label());
        match self {
            Source::User => label.cyan().to_string(),
            Source::Routine => label.magenta().to_string(),
            Source::Feed => label.green().to_string(),
        }
    }
}

impl Render for Occurrence {
    fn render(&self) -> String {
        let time = match self.time {
            Some(time) => time.to_string(),
            None => "all-day".to_string(),
        };

        let mut line = format!("{:<7} {} {}", time.dimmed(), self.title.bold(), self.source.render());
        if let Some(link) = self.link() {
            line.push_str(&format!("\n{:<7} {}", "", link.dimmed().underline()));
        }
        line
    }
}

impl Render for FeedStatus {
    fn render(&self) -> String {
        match self {
            FeedStatus::Clean { .. } => self.to_string().green().to_string(),
            FeedStatus::Partial { .. } => self.to_string().yellow().to_string(),
            FeedStatus::Failed { .. } => self.to_string().red().to_string(),
            FeedStatus::Pending | FeedStatus::NoSources => self.to_string().dimmed().to_string(),
        }
    }
}

impl Render for SourceReport {
    fn render(&self) -> String {
        match &self.outcome {
            SourceOutcome::Fetched(count) => format!(
                "{} {} {}",
                "✓".green(),
                self.url,
                format!("({count} {})", pluralize("event", *count)).dimmed()
            ),
            SourceOutcome::Failed(error) => {
                format!("{} {} {}", "✗".red(), self.url, error.red())
            }
        }
    }
}

impl Render for Routine {
    fn render(&self) -> String {
        let days: Vec<&str> = self
            .days_of_week
            .iter()
            .filter_map(|d| WEEKDAYS.get(usize::from(*d)).copied())
            .collect();

        let range = match self.end_date {
            Some(end) => format!("{} to {}", self.start_date, end),
            None => format!("from {}", self.start_date),
        };

        format!(
            "{} {} {} {}\n   {}",
            self.time.to_string().dimmed(),
            self.title.bold(),
            days.join(",").magenta(),
            range.dimmed(),
            self.id.dimmed()
        )
    }
}

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
