//! Error types for daybook.

use thiserror::Error;

/// Errors that can occur in daybook operations.
///
/// Feed fetch failures and store corruption are absorbed inside the engine
/// (logged and summarized); only input validation errors are meant to reach
/// the user for correction.
#[derive(Error, Debug)]
pub enum DaybookError {
    #[error("Invalid feed URL '{0}': only http and https sources are supported")]
    InvalidSource(String),

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid time '{0}'. Expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid weekdays '{0}'. Use 'all' or a comma separated list like mon,wed,fri")]
    InvalidWeekdays(String),

    #[error("Invalid month {0}. Expected 1-12")]
    InvalidMonth(u32),

    #[error("Invalid routine: {0}")]
    InvalidRoutine(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Only manually created events can be deleted ('{0}' is not one)")]
    NotUserEvent(String),

    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for daybook operations.
pub type DaybookResult<T> = Result<T, DaybookError>;
