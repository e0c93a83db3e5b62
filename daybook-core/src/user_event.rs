//! Manually created events.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DaybookError, DaybookResult};
use crate::occurrence::{Occurrence, OccurrenceMeta, Source, TimeOfDay};

/// A persisted, user-entered event. Maps one-to-one onto an `Occurrence`
/// with `source = user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<TimeOfDay>,
    #[serde(default)]
    pub meta: OccurrenceMeta,
}

impl UserEvent {
    pub fn new(title: &str, date: NaiveDate, time: Option<TimeOfDay>) -> DaybookResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DaybookError::InvalidEvent("title is empty".into()));
        }

        // Millisecond timestamps alone collide when events are created in a burst
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("user:{}-{}", Utc::now().timestamp_millis(), &suffix[..8]);

        Ok(UserEvent {
            id,
            title: title.to_string(),
            date,
            time,
            meta: OccurrenceMeta::default(),
        })
    }

    pub fn to_occurrence(&self) -> Occurrence {
        Occurrence {
            id: self.id.clone(),
            title: self.title.clone(),
            date: self.date,
            time: self.time,
            source: Source::User,
            meta: self.meta.clone(),
        }
    }
}
