//! ICS feed parsing using the icalendar crate's parser.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Timelike};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{DaybookError, DaybookResult};
use crate::occurrence::{Occurrence, OccurrenceMeta, Source, TimeOfDay};

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));

const UNTITLED: &str = "Untitled event";

/// Parse a whole feed body into occurrences.
///
/// `feed_index` is the position of the feed in the source list and becomes
/// part of every occurrence id. Start times carrying a zone are converted to
/// `local`; floating times are taken as local wall-clock values.
///
/// Components without a usable DTSTART are skipped. A body that is not an
/// iCalendar document is an error.
pub fn parse_feed<Tz: TimeZone>(
    content: &str,
    feed_index: usize,
    feed_url: &str,
    local: &Tz,
) -> DaybookResult<Vec<Occurrence>> {
    if !is_calendar_document(content) {
        return Err(DaybookError::Fetch(format!(
            "{feed_url} did not return an iCalendar document"
        )));
    }

    let unfolded = unfold(content);

    let calendar = read_calendar(&unfolded)
        .map_err(|e| DaybookError::Fetch(format!("Could not parse {feed_url}: {e}")))?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);

    let mut seen_uids: HashMap<String, usize> = HashMap::new();
    let mut occurrences = Vec::with_capacity(vevents.len());
    let mut skipped = 0;

    for (position, vevent) in vevents.into_iter().enumerate() {
        let Some(start) = vevent
            .find_prop("DTSTART")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
        else {
            skipped += 1;
            continue;
        };
        let (date, time) = resolve_start(start, local);

        let uid = vevent
            .find_prop("UID")
            .map(|p| p.val.to_string())
            .filter(|uid| !uid.trim().is_empty())
            .unwrap_or_else(|| format!("u{feed_index}-{position}"));

        // Recurrence overrides reuse their master's UID
        let copies = seen_uids.entry(uid.clone()).or_insert(0);
        let id = if *copies == 0 {
            format!("feed:{feed_index}:{uid}")
        } else {
            format!("feed:{feed_index}:{uid}:{copies}")
        };
        *copies += 1;

        let title = vevent
            .find_prop("SUMMARY")
            .map(|p| unescape_text(p.val.as_ref()))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        occurrences.push(Occurrence {
            id,
            title,
            date,
            time,
            source: Source::Feed,
            meta: OccurrenceMeta {
                link: find_link(vevent),
                feed: Some(feed_url.to_string()),
                ..OccurrenceMeta::default()
            },
        });
    }

    if skipped > 0 {
        debug!(feed = feed_url, skipped, "skipped events without a start date");
    }

    Ok(occurrences)
}

fn is_calendar_document(content: &str) -> bool {
    const HEADER: &str = "BEGIN:VCALENDAR";

    content
        .trim_start_matches('\u{feff}')
        .trim_start()
        .get(..HEADER.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(HEADER))
}

fn collect_vevents<'c, 'a>(components: &'c [Component<'a>], out: &mut Vec<&'c Component<'a>>) {
    for component in components {
        if component.name.as_ref().eq_ignore_ascii_case("VEVENT") {
            out.push(component);
        }
        collect_vevents(&component.components, out);
    }
}

/// Resolve a DTSTART into a local date and optional time of day.
fn resolve_start<Tz: TimeZone>(start: DatePerhapsTime, local: &Tz) -> (NaiveDate, Option<TimeOfDay>) {
    match start {
        DatePerhapsTime::Date(date) => (date, None),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Floating(naive) => wall_clock(naive),
            CalendarDateTime::Utc(dt) => wall_clock(dt.with_timezone(local).naive_local()),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                // Unknown zone ids (custom VTIMEZONE names) are read as floating
                let zoned = tzid
                    .parse::<chrono_tz::Tz>()
                    .ok()
                    .and_then(|zone| zone.from_local_datetime(&date_time).earliest());
                match zoned {
                    Some(dt) => wall_clock(dt.with_timezone(local).naive_local()),
                    None => wall_clock(date_time),
                }
            }
        },
    }
}

fn wall_clock(naive: NaiveDateTime) -> (NaiveDate, Option<TimeOfDay>) {
    (
        naive.date(),
        TimeOfDay::new(naive.hour() as u8, naive.minute() as u8),
    )
}

/// The URL property if present, otherwise the first http(s) URL in the
/// description.
fn find_link(vevent: &Component<'_>) -> Option<String> {
    if let Some(url) = vevent.find_prop("URL") {
        let url = url.val.as_ref().trim();
        if !url.is_empty() {
            return Some(url.to_string());
        }
    }

    let description = unescape_text(vevent.find_prop("DESCRIPTION")?.val.as_ref());
    URL_RE
        .find(&description)
        .map(|m| m.as_str().to_string())
}

/// Undo RFC 5545 TEXT escaping.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
