//! Source-neutral occurrence types.
//!
//! Every event source (manual events, routines, ICS feeds) is converted into
//! `Occurrence` values before merging, so the aggregator and front ends only
//! ever deal with this one shape.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DaybookError;

/// Canonical on-disk and index key format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One concrete, dated, possibly-timed instance of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    /// None means all-day
    pub time: Option<TimeOfDay>,
    pub source: Source,
    #[serde(default)]
    pub meta: OccurrenceMeta,
}

impl Occurrence {
    /// The `YYYY-MM-DD` key this occurrence is grouped under.
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    pub fn link(&self) -> Option<&str> {
        self.meta.link.as_deref()
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.time {
            Some(time) => write!(f, "{} - {}", self.title, time),
            None => write!(f, "{}", self.title),
        }
    }
}

/// Where an occurrence came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    User,
    Routine,
    Feed,
}

impl Source {
    pub fn label(&self) -> &'static str {
        match self {
            Source::User => "Manual",
            Source::Routine => "Routine",
            Source::Feed => "Feed",
        }
    }
}

/// Auxiliary occurrence fields.
///
/// Only `link` is consumed by the engine's collaborators. Unknown fields are
/// kept in `extra` so persisted documents round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccurrenceMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Feed URL the occurrence was fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Wall-clock time of day, serialized as `[hour, minute]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour <= 23 && minute <= 59).then_some(TimeOfDay { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }
}

impl TryFrom<(u8, u8)> for TimeOfDay {
    type Error = DaybookError;

    fn try_from((hour, minute): (u8, u8)) -> Result<Self, Self::Error> {
        TimeOfDay::new(hour, minute)
            .ok_or_else(|| DaybookError::InvalidTime(format!("{hour}:{minute}")))
    }
}

impl From<TimeOfDay> for (u8, u8) {
    fn from(time: TimeOfDay) -> Self {
        (time.hour, time.minute)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
