//! Merging of user events, routines and feed occurrences into a per-date view.
//!
//! Every call is a full recomputation from its inputs; one month of events is
//! small enough that nothing is cached between calls.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::month::MonthWindow;
use crate::occurrence::{DATE_FORMAT, Occurrence};
use crate::recurrence::expand_routines;
use crate::routine::Routine;
use crate::user_event::UserEvent;

/// Occurrences of one month grouped by `YYYY-MM-DD`.
///
/// Dates without occurrences have no entry. Each entry is sorted with
/// `compare_occurrences`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MonthIndex(BTreeMap<String, Vec<Occurrence>>);

impl MonthIndex {
    pub fn get(&self, date_key: &str) -> Option<&[Occurrence]> {
        self.0.get(date_key).map(Vec::as_slice)
    }

    pub fn get_date(&self, date: NaiveDate) -> Option<&[Occurrence]> {
        self.get(&date.format(DATE_FORMAT).to_string())
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Occurrence])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of dates with at least one occurrence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<Occurrence>> {
        self.0
    }
}

/// Ordering within a single date: timed occurrences by time of day, all-day
/// occurrences after every timed one, ties by title (byte-wise).
pub fn compare_occurrences(a: &Occurrence, b: &Occurrence) -> Ordering {
    (a.time.is_none(), a.time)
        .cmp(&(b.time.is_none(), b.time))
        .then_with(|| a.title.cmp(&b.title))
}

/// Build the per-date index for `window` from all three sources.
pub fn build_month_index(
    window: MonthWindow,
    user_events: &[UserEvent],
    routines: &[Routine],
    feed_occurrences: &[Occurrence],
) -> MonthIndex {
    let user = user_events
        .iter()
        .filter(|e| window.contains(e.date))
        .map(UserEvent::to_occurrence);

    let feed = feed_occurrences
        .iter()
        .filter(|o| window.contains(o.date))
        .cloned();

    let mut index: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in user.chain(feed).chain(expand_routines(routines, window)) {
        index
            .entry(occurrence.date_key())
            .or_default()
            .push(occurrence);
    }

    for occurrences in index.values_mut() {
        // stable, so equal keys keep source order
        occurrences.sort_by(compare_occurrences);
    }

    MonthIndex(index)
}

/// Occurrences on a single date, sorted; empty when there are none.
pub fn occurrences_for_date(
    date: NaiveDate,
    user_events: &[UserEvent],
    routines: &[Routine],
    feed_occurrences: &[Occurrence],
) -> Vec<Occurrence> {
    let key = date.format(DATE_FORMAT).to_string();
    build_month_index(MonthWindow::of(date), user_events, routines, feed_occurrences)
        .into_inner()
        .remove(&key)
        .unwrap_or_default()
}
