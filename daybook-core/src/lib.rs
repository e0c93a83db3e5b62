//! Event aggregation and feed synchronization for daybook.
//!
//! This crate merges three sources into one per-day agenda:
//! - `UserEvent`s entered by hand
//! - weekly `Routine`s, expanded per month by `recurrence`
//! - remote ICS feeds, fetched by `feed::FeedClient` and kept fresh by
//!   `refresh::RefreshLoop`
//!
//! `aggregate` does the merge; `Daybook` wires everything to disk.

pub mod aggregate;
pub mod config;
pub mod daybook;
pub mod error;
pub mod feed;
pub mod input;
pub mod month;
pub mod occurrence;
pub mod recurrence;
pub mod refresh;
pub mod routine;
pub mod store;
pub mod user_event;

pub use aggregate::{MonthIndex, build_month_index, occurrences_for_date};
pub use config::DaybookConfig;
pub use daybook::Daybook;
pub use error::{DaybookError, DaybookResult};
pub use feed::{FeedClient, FeedSnapshot, FeedStatus, SourceAdded};
pub use month::MonthWindow;
pub use occurrence::{Occurrence, OccurrenceMeta, Source, TimeOfDay};
pub use refresh::{RefreshHandle, RefreshLoop};
pub use routine::{RecurrenceKind, Routine};
pub use store::JsonStore;
pub use user_event::UserEvent;
