//! Feed snapshot and status types.

use std::fmt;

use chrono::{DateTime, Local};

use crate::occurrence::Occurrence;

/// The materialized result of one completed fetch cycle.
///
/// Snapshots are immutable. The feed client replaces the whole value on every
/// cycle, so readers holding an `Arc<FeedSnapshot>` always see a complete,
/// internally consistent cycle.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub occurrences: Vec<Occurrence>,
    pub status: FeedStatus,
    pub sources: Vec<SourceReport>,
    pub completed_at: Option<DateTime<Local>>,
}

impl FeedSnapshot {
    pub(crate) fn completed(
        occurrences: Vec<Occurrence>,
        status: FeedStatus,
        sources: Vec<SourceReport>,
    ) -> Self {
        FeedSnapshot {
            occurrences,
            status,
            sources,
            completed_at: Some(Local::now()),
        }
    }
}

/// Aggregate status of a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    /// No cycle has completed yet
    #[default]
    Pending,
    NoSources,
    Clean { total: usize },
    Partial { total: usize, failures: usize },
    Failed { failures: usize },
}

impl FeedStatus {
    /// Classify a finished cycle from its counters.
    pub fn from_counts(total: usize, failures: usize) -> Self {
        match (total, failures) {
            (_, 0) => FeedStatus::Clean { total },
            (0, failures) => FeedStatus::Failed { failures },
            (total, failures) => FeedStatus::Partial { total, failures },
        }
    }
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FeedStatus::Pending => write!(f, "Feeds: loading..."),
            FeedStatus::NoSources => write!(f, "Feeds: no sources"),
            FeedStatus::Clean { total } => write!(f, "Feeds: {} {}", total, events(*total)),
            FeedStatus::Partial { total, failures } => write!(
                f,
                "Feeds: {} {}, {} {}",
                total,
                events(*total),
                failures,
                if *failures == 1 { "failure" } else { "failures" }
            ),
            FeedStatus::Failed { .. } => write!(f, "Feeds: error loading sources"),
        }
    }
}

fn events(count: usize) -> &'static str {
    if count == 1 { "event" } else { "events" }
}

/// Outcome of fetching a single source during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub url: String,
    pub outcome: SourceOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Number of occurrences parsed from the feed
    Fetched(usize),
    Failed(String),
}
