//! Stays and the validated date intervals they cover.
//!
//! Every date in this crate is a [`NaiveDate`]: there is no time of day and
//! no timezone, so two values that name the same calendar day always compare
//! equal and day arithmetic never drifts across DST or UTC offsets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StayError;
use crate::records::{normalize_country_code, StayRecord};
use crate::rule::Window;

// ── Interval ────────────────────────────────────────────────────────────────

/// An inclusive `[entry, exit]` span of calendar days with `entry <= exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    entry: NaiveDate,
    exit: NaiveDate,
}

impl Interval {
    /// Build an interval, rejecting an exit before the entry.
    ///
    /// Endpoints are never swapped: a reversed pair is almost always a data
    /// entry mistake.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::InvalidInterval`] if `exit < entry`.
    pub fn new(entry: NaiveDate, exit: NaiveDate) -> Result<Self, StayError> {
        if exit < entry {
            return Err(StayError::InvalidInterval(format!(
                "exit date {exit} is before entry date {entry}"
            )));
        }
        Ok(Self { entry, exit })
    }

    /// A one-day interval.
    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            entry: day,
            exit: day,
        }
    }

    pub fn entry(&self) -> NaiveDate {
        self.entry
    }

    pub fn exit(&self) -> NaiveDate {
        self.exit
    }

    /// Inclusive day count: entry and exit days both count.
    pub fn len_days(&self) -> i64 {
        (self.exit - self.entry).num_days() + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.entry <= day && day <= self.exit
    }

    /// Every day of the interval, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let exit = self.exit;
        self.entry.iter_days().take_while(move |day| *day <= exit)
    }

    /// Number of this interval's days that fall inside `window`.
    ///
    /// Clamps the interval to `[max(entry, window.start), min(exit, window.end)]`
    /// and counts the clamped span, or returns 0 when nothing overlaps.
    pub fn days_within(&self, window: &Window) -> i64 {
        let start = self.entry.max(window.start);
        let end = self.exit.min(window.end);
        if start <= end {
            (end - start).num_days() + 1
        } else {
            0
        }
    }

    /// The part of this interval up to and including `day`, or `None` when
    /// `day` is before the entry.
    pub fn truncated_at(&self, day: NaiveDate) -> Option<Self> {
        if day < self.entry {
            return None;
        }
        Some(Self {
            entry: self.entry,
            exit: self.exit.min(day),
        })
    }
}

// ── Stay ────────────────────────────────────────────────────────────────────

/// Whether a stay consumes quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StayKind {
    /// A short stay; every day counts toward the quota.
    #[default]
    #[serde(rename = "short", alias = "short_stay", alias = "counted")]
    Counted,
    /// Presence under a residence permit or long-stay visa; recorded but never
    /// counted.
    #[serde(rename = "residence", alias = "long_stay", alias = "exempt")]
    Exempt,
}

/// One recorded or planned period of presence.
///
/// Confirmed stays (history) and proposed trips (plans) share this type. The
/// `id` only identifies a stay for exclusion and display; it plays no part in
/// the day arithmetic.
///
/// Serialises through [`StayRecord`], which validates on the way in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StayRecord", into = "StayRecord")]
pub struct Stay {
    pub id: String,
    pub interval: Interval,
    pub kind: StayKind,
    /// ISO 3166-1 alpha-2 code of the country entered, upper case.
    pub country_code: Option<String>,
}

impl Stay {
    /// A recorded stay of the given kind.
    pub fn confirmed(id: impl Into<String>, interval: Interval, kind: StayKind) -> Self {
        Self {
            id: id.into(),
            interval,
            kind,
            country_code: None,
        }
    }

    /// A planned trip. Planned trips always count toward the quota.
    pub fn proposed(id: impl Into<String>, interval: Interval) -> Self {
        Self {
            id: id.into(),
            interval,
            kind: StayKind::Counted,
            country_code: None,
        }
    }

    /// Record the country entered. The code is upper-cased; a blank code
    /// clears it.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::InvalidRecord`] unless the code is two letters.
    pub fn with_country(mut self, code: &str) -> Result<Self, StayError> {
        self.country_code = normalize_country_code(code)?;
        Ok(self)
    }

    pub fn is_counted(&self) -> bool {
        self.kind == StayKind::Counted
    }
}

/// The intervals of the stays that consume quota.
pub fn counted_intervals<'a, I>(stays: I) -> impl Iterator<Item = &'a Interval>
where
    I: IntoIterator<Item = &'a Stay>,
{
    stays
        .into_iter()
        .filter(|stay| stay.is_counted())
        .map(|stay| &stay.interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::WindowRule;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reversed_interval_rejected() {
        let result = Interval::new(date(2024, 1, 10), date(2024, 1, 1));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid interval"), "got: {err}");
        assert!(err.contains("2024-01-01"), "got: {err}");
    }

    #[test]
    fn test_monday_to_friday_is_five_days() {
        // 2024-01-08 is a Monday
        let week = Interval::new(date(2024, 1, 8), date(2024, 1, 12)).unwrap();
        assert_eq!(week.len_days(), 5);
        assert_eq!(week.days().count(), 5);
    }

    #[test]
    fn test_single_day_has_length_one() {
        let day = Interval::single_day(date(2024, 2, 29));
        assert_eq!(day.len_days(), 1);
        assert_eq!(day.days().collect::<Vec<_>>(), vec![date(2024, 2, 29)]);
    }

    #[test]
    fn test_days_within_clamps_both_ends() {
        let window = WindowRule::new(10, 5).unwrap().window_ending(date(2024, 1, 20));
        // window is 2024-01-11..=2024-01-20
        let straddles_start = Interval::new(date(2024, 1, 5), date(2024, 1, 12)).unwrap();
        let straddles_end = Interval::new(date(2024, 1, 19), date(2024, 1, 25)).unwrap();
        let covers = Interval::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(straddles_start.days_within(&window), 2);
        assert_eq!(straddles_end.days_within(&window), 2);
        assert_eq!(covers.days_within(&window), 10);
    }

    #[test]
    fn test_days_within_outside_window_is_zero() {
        let window = WindowRule::new(10, 5).unwrap().window_ending(date(2024, 1, 20));
        let before = Interval::new(date(2024, 1, 1), date(2024, 1, 10)).unwrap();
        let after = Interval::single_day(date(2024, 1, 21));
        assert_eq!(before.days_within(&window), 0);
        assert_eq!(after.days_within(&window), 0);
    }

    #[test]
    fn test_truncated_at() {
        let trip = Interval::new(date(2024, 3, 1), date(2024, 3, 10)).unwrap();
        assert_eq!(trip.truncated_at(date(2024, 2, 28)), None);
        assert_eq!(
            trip.truncated_at(date(2024, 3, 4)),
            Some(Interval::new(date(2024, 3, 1), date(2024, 3, 4)).unwrap())
        );
        assert_eq!(trip.truncated_at(date(2024, 4, 1)), Some(trip));
    }

    #[test]
    fn test_counted_intervals_skips_exempt() {
        let short = Stay::confirmed(
            "a",
            Interval::new(date(2024, 1, 1), date(2024, 1, 3)).unwrap(),
            StayKind::Counted,
        );
        let residence = Stay::confirmed(
            "b",
            Interval::new(date(2023, 1, 1), date(2024, 12, 31)).unwrap(),
            StayKind::Exempt,
        );
        let stays = [short.clone(), residence];
        let counted: Vec<_> = counted_intervals(&stays).collect();
        assert_eq!(counted, vec![&short.interval]);
    }

    #[test]
    fn test_with_country_normalises() {
        let trip = Stay::proposed("p1", Interval::single_day(date(2024, 7, 1)));
        let tagged = trip.clone().with_country(" it ").unwrap();
        assert_eq!(tagged.country_code.as_deref(), Some("IT"));
        assert_eq!(tagged.with_country("").unwrap().country_code, None);
        let err = trip.with_country("ITA").unwrap_err();
        assert!(matches!(err, StayError::InvalidRecord(_)), "got: {err}");
    }

    #[test]
    fn test_proposed_is_always_counted() {
        let trip = Stay::proposed("p1", Interval::single_day(date(2024, 7, 1)));
        assert!(trip.is_counted());
        assert_eq!(trip.country_code, None);
    }
}
