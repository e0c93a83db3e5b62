//! Routine expansion.
//!
//! Expands a routine into dated occurrences within a single month window.
//! Expansion is a pure function of its inputs: no I/O, no state, identical
//! output for identical input.

use chrono::{Datelike, NaiveDate};

use crate::month::MonthWindow;
use crate::occurrence::{DATE_FORMAT, Occurrence, OccurrenceMeta, Source};
use crate::routine::{RecurrenceKind, Routine};

/// Whether `routine` produces an occurrence on `date`.
fn occurs_on(routine: &Routine, date: NaiveDate) -> bool {
    let weekday = date.weekday().num_days_from_monday() as u8;

    routine.days_of_week.contains(&weekday)
        && date >= routine.start_date
        && routine.end_date.is_none_or(|end| date <= end)
}

/// Expand one routine into occurrences for every qualifying date of `window`.
///
/// Routines of a kind other than weekly expand to nothing.
pub fn expand_routine(routine: &Routine, window: MonthWindow) -> Vec<Occurrence> {
    if routine.kind != RecurrenceKind::Weekly {
        return Vec::new();
    }

    window
        .days()
        .filter(|date| occurs_on(routine, *date))
        .map(|date| Occurrence {
            id: format!("{}:{}", routine.id, date.format(DATE_FORMAT)),
            title: routine.title.clone(),
            date,
            time: Some(routine.time),
            source: Source::Routine,
            meta: OccurrenceMeta::default(),
        })
        .collect()
}

/// Expand every routine for `window`, preserving input order.
pub fn expand_routines(routines: &[Routine], window: MonthWindow) -> Vec<Occurrence> {
    routines
        .iter()
        .flat_map(|routine| expand_routine(routine, window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurrence::TimeOfDay;
    use chrono::Weekday;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn gym() -> Routine {
        Routine {
            id: "routine:1".into(),
            title: "Gym".into(),
            kind: RecurrenceKind::Weekly,
            days_of_week: BTreeSet::from([0]),
            time: TimeOfDay::new(7, 0).unwrap(),
            start_date: date(2024, 1, 1),
            end_date: None,
        }
    }

    #[test]
    fn gym_every_monday_of_january_2024() {
        let window = MonthWindow::new(2024, 1).unwrap();
        let occurrences = expand_routine(&gym(), window);

        let dates: Vec<NaiveDate> = occurrences.iter().map(|o| o.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 8),
                date(2024, 1, 15),
                date(2024, 1, 22),
                date(2024, 1, 29),
            ]
        );
        for occ in &occurrences {
            assert_eq!(occ.time, TimeOfDay::new(7, 0));
            assert_eq!(occ.source, Source::Routine);
            assert_eq!(occ.title, "Gym");
        }
        assert_eq!(occurrences[0].id, "routine:1:2024-01-01");
    }

    #[test]
    fn respects_start_and_end_bounds() {
        let mut routine = gym();
        routine.days_of_week = (0..7).collect();
        routine.start_date = date(2024, 3, 10);
        routine.end_date = Some(date(2024, 3, 12));

        let window = MonthWindow::new(2024, 3).unwrap();
        let dates: Vec<NaiveDate> = expand_routine(&routine, window)
            .into_iter()
            .map(|o| o.date)
            .collect();

        assert_eq!(dates, vec![date(2024, 3, 10), date(2024, 3, 11), date(2024, 3, 12)]);
    }

    #[test]
    fn every_qualifying_date_is_included() {
        let mut routine = gym();
        routine.days_of_week = BTreeSet::from([2, 5]);
        routine.start_date = date(2023, 6, 14);

        for (y, m) in [(2023, 6), (2023, 7), (2024, 2)] {
            let window = MonthWindow::new(y, m).unwrap();
            let produced: BTreeSet<NaiveDate> = expand_routine(&routine, window)
                .into_iter()
                .map(|o| o.date)
                .collect();

            let expected: BTreeSet<NaiveDate> = window
                .days()
                .filter(|d| matches!(d.weekday(), Weekday::Wed | Weekday::Sat))
                .filter(|d| *d >= routine.start_date)
                .collect();

            assert_eq!(produced, expected, "mismatch for {y}-{m}");
        }
    }

    #[test]
    fn before_start_month_yields_nothing() {
        let window = MonthWindow::new(2023, 12).unwrap();
        assert!(expand_routine(&gym(), window).is_empty());
    }

    #[test]
    fn unknown_kind_is_a_no_op() {
        let mut routine = gym();
        routine.kind = RecurrenceKind::Other("monthly".into());
        let window = MonthWindow::new(2024, 1).unwrap();
        assert!(expand_routine(&routine, window).is_empty());
    }

    #[test]
    fn expansion_is_deterministic() {
        let routines = vec![gym(), {
            let mut r = gym();
            r.id = "routine:2".into();
            r.days_of_week = BTreeSet::from([4]);
            r
        }];
        let window = MonthWindow::new(2024, 1).unwrap();
        assert_eq!(
            expand_routines(&routines, window),
            expand_routines(&routines, window)
        );
        assert_eq!(expand_routines(&routines, window).len(), 5 + 4);
    }
}
