//! Publish and promote date windows
//!
//! Both windows are anchored on a reference date. The published window runs
//! from that date to `published_months` later, both ends included. The
//! promoted window starts the day after the published window ends and runs
//! to `promoted_months` after the reference date, end included. A date can
//! therefore never fall in both.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::CalendarConfig;

/// Add calendar months, clamping to the last day of shorter months
/// (31 August + 1 month is 30 September).
pub fn months_ahead(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Resolved date bounds for one reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindows {
    pub today: NaiveDate,
    /// Last day of the published window, also the exclusive start of the promoted window
    pub published_until: NaiveDate,
    /// Last day of the promoted window
    pub promoted_until: NaiveDate,
}

impl EventWindows {
    pub fn for_date(today: NaiveDate, calendar: &CalendarConfig) -> Self {
        Self {
            today,
            published_until: months_ahead(today, calendar.published_months),
            promoted_until: months_ahead(today, calendar.promoted_months),
        }
    }

    pub fn is_published(&self, date: NaiveDate) -> bool {
        self.today <= date && date <= self.published_until
    }

    pub fn is_promoted(&self, date: NaiveDate) -> bool {
        self.published_until < date && date <= self.promoted_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_ahead_plain() {
        assert_eq!(months_ahead(date(2026, 10, 14), 2), date(2026, 12, 14));
        assert_eq!(months_ahead(date(2026, 10, 14), 8), date(2027, 6, 14));
    }

    #[test]
    fn test_months_ahead_clamps_to_month_end() {
        assert_eq!(months_ahead(date(2026, 12, 31), 2), date(2027, 2, 28));
        assert_eq!(months_ahead(date(2027, 12, 31), 2), date(2028, 2, 29));
        assert_eq!(months_ahead(date(2026, 8, 31), 1), date(2026, 9, 30));
        assert_eq!(months_ahead(date(2026, 8, 31), 2), date(2026, 10, 31));
    }

    #[test]
    fn test_default_windows() {
        let windows = EventWindows::for_date(date(2026, 10, 14), &CalendarConfig::default());
        assert_eq!(windows.published_until, date(2026, 12, 14));
        assert_eq!(windows.promoted_until, date(2027, 6, 14));
    }

    #[test]
    fn test_boundaries() {
        let windows = EventWindows::for_date(date(2026, 10, 14), &CalendarConfig::default());

        assert!(!windows.is_published(date(2026, 10, 13)));
        assert!(windows.is_published(date(2026, 10, 14)));

        // The two-month boundary is published, not promoted
        assert!(windows.is_published(date(2026, 12, 14)));
        assert!(!windows.is_promoted(date(2026, 12, 14)));

        assert!(!windows.is_published(date(2026, 12, 15)));
        assert!(windows.is_promoted(date(2026, 12, 15)));

        assert!(windows.is_promoted(date(2027, 6, 14)));
        assert!(!windows.is_promoted(date(2027, 6, 15)));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_date() -> impl Strategy<Value = NaiveDate> {
            (2000i32..2100, 1u32..=12, 1u32..=31).prop_filter_map("valid date", |(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d)
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn windows_never_overlap(today in any_date(), offset in 0i64..400) {
                let windows = EventWindows::for_date(today, &CalendarConfig::default());
                let candidate = today + chrono::Duration::days(offset);
                prop_assert!(!(windows.is_published(candidate) && windows.is_promoted(candidate)));
            }

            #[test]
            fn windows_are_contiguous(today in any_date()) {
                let windows = EventWindows::for_date(today, &CalendarConfig::default());
                let next = windows.published_until.succ_opt().unwrap();
                prop_assert!(windows.is_published(windows.published_until));
                prop_assert!(windows.is_promoted(next));
            }
        }
    }
}
