//! Persisted recurrence rules ("routines").

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, DaybookResult};
use crate::occurrence::TimeOfDay;

/// A recurrence rule that generates occurrences on a weekly pattern within a
/// date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    /// 0 = Monday ... 6 = Sunday
    pub days_of_week: BTreeSet<u8>,
    pub time: TimeOfDay,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Routine {
    /// Create a weekly routine with a creation-time id.
    pub fn weekly(
        title: &str,
        days_of_week: BTreeSet<u8>,
        time: TimeOfDay,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> DaybookResult<Self> {
        let routine = Routine {
            id: format!("routine:{}", Utc::now().timestamp_millis()),
            title: title.trim().to_string(),
            kind: RecurrenceKind::Weekly,
            days_of_week,
            time,
            start_date,
            end_date,
        };
        routine.validate()?;
        Ok(routine)
    }

    pub fn validate(&self) -> DaybookResult<()> {
        if self.title.is_empty() {
            return Err(DaybookError::InvalidRoutine("title is empty".into()));
        }
        if self.days_of_week.is_empty() {
            return Err(DaybookError::InvalidRoutine("no weekdays selected".into()));
        }
        if let Some(day) = self.days_of_week.iter().find(|d| **d > 6) {
            return Err(DaybookError::InvalidRoutine(format!(
                "weekday index {day} out of range"
            )));
        }
        if self.end_date.is_some_and(|end| end < self.start_date) {
            return Err(DaybookError::InvalidRoutine(
                "end date is before start date".into(),
            ));
        }
        Ok(())
    }
}

/// Recurrence kind. Only weekly routines expand; anything else is preserved
/// as written so newer documents survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecurrenceKind {
    Weekly,
    Other(String),
}

impl From<String> for RecurrenceKind {
    fn from(s: String) -> Self {
        if s == "weekly" {
            RecurrenceKind::Weekly
        } else {
            RecurrenceKind::Other(s)
        }
    }
}

impl From<RecurrenceKind> for String {
    fn from(kind: RecurrenceKind) -> Self {
        match kind {
            RecurrenceKind::Weekly => "weekly".to_string(),
            RecurrenceKind::Other(s) => s,
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecurrenceKind::Weekly => write!(f, "weekly"),
            RecurrenceKind::Other(s) => write!(f, "{s}"),
        }
    }
}
