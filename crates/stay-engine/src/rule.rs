//! Window and quota configuration.
//!
//! The short-stay rule allows 90 days of presence in any 180-day period.
//! Both numbers live in [`WindowRule`] so the same engine answers any
//! "N days within any rolling M-day window" question.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::StayError;

/// Length of the rolling lookback window under the short-stay rule.
pub const SHORT_STAY_WINDOW_DAYS: u32 = 180;

/// Days of presence allowed inside one window under the short-stay rule.
pub const SHORT_STAY_QUOTA_DAYS: u32 = 90;

/// A rolling-window quota: at most `quota_days` days of presence inside any
/// `window_days`-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowRule {
    /// Inclusive length of the lookback window in days.
    pub window_days: u32,
    /// Days allowed inside one window.
    pub quota_days: u32,
}

impl WindowRule {
    /// The 90/180 short-stay rule.
    pub const SHORT_STAY: WindowRule = WindowRule {
        window_days: SHORT_STAY_WINDOW_DAYS,
        quota_days: SHORT_STAY_QUOTA_DAYS,
    };

    /// Build a rule, rejecting an empty window.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::InvalidRule`] if `window_days` is zero.
    pub fn new(window_days: u32, quota_days: u32) -> Result<Self, StayError> {
        if window_days == 0 {
            return Err(StayError::InvalidRule(
                "window must span at least one day".to_string(),
            ));
        }
        Ok(Self {
            window_days,
            quota_days,
        })
    }

    /// The quota as a signed day count, for `remaining` arithmetic.
    pub fn quota(&self) -> i64 {
        i64::from(self.quota_days)
    }

    /// The window whose last day is `end`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use stay_engine::WindowRule;
    ///
    /// let end = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    /// let window = WindowRule::SHORT_STAY.window_ending(end);
    /// assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    /// assert_eq!(window.len_days(), 180);
    /// ```
    pub fn window_ending(&self, end: NaiveDate) -> Window {
        let span = u64::from(self.window_days.saturating_sub(1));
        let start = end.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        Window { start, end }
    }
}

impl Default for WindowRule {
    fn default() -> Self {
        Self::SHORT_STAY
    }
}

/// An inclusive `[start, end]` lookback window.
///
/// Always derived from a reference date through [`WindowRule::window_ending`],
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// Whether `day` falls inside the window; both endpoints are included.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Inclusive number of days in the window.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Options for [`crate::feasibility::next_full_entry_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySearchOptions {
    /// Length of the stay that must fit, in days.
    pub desired_days: u32,
    /// How many candidate entry dates to try, starting at the search date.
    pub horizon_days: u32,
}

impl EntrySearchOptions {
    /// Search a year ahead for a stay that uses the whole quota of `rule`.
    pub fn for_rule(rule: &WindowRule) -> Self {
        Self {
            desired_days: rule.quota_days,
            horizon_days: 365,
        }
    }
}

impl Default for EntrySearchOptions {
    fn default() -> Self {
        Self::for_rule(&WindowRule::SHORT_STAY)
    }
}
