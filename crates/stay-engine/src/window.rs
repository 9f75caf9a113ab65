//! Window accounting: days of presence inside one rolling window.
//!
//! This is the only place that counts days. The feasibility scan and the
//! timeline aggregation both call [`days_used_in_window`] for every day they
//! inspect, so every caller agrees on clamping and inclusivity.

use chrono::NaiveDate;
use serde::Serialize;

use crate::interval::{counted_intervals, Interval, Stay};
use crate::rule::{Window, WindowRule};

/// Usage of one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowUsage {
    /// The window ending at the reference date.
    pub window: Window,
    /// Days of presence inside the window. Never negative.
    pub used: i64,
    /// `quota - used`. Negative means an overstay; zero means exactly at the
    /// limit, which is still compliant.
    pub remaining: i64,
}

impl WindowUsage {
    pub fn is_over_quota(&self) -> bool {
        self.remaining < 0
    }
}

/// Count the days of `intervals` that fall in the window ending at `reference`.
///
/// `intervals` must already be restricted to counted stays; callers merge
/// confirmed and proposed collections as needed. Each interval contributes its
/// own overlap, so two intervals covering the same day count that day twice.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use stay_engine::{days_used_in_window, Interval, WindowRule};
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// let stays = [Interval::new(d(1, 1), d(1, 10)).unwrap()];
/// let usage = days_used_in_window(d(1, 10), &stays, &WindowRule::SHORT_STAY);
/// assert_eq!(usage.used, 10);
/// assert_eq!(usage.remaining, 80);
/// ```
pub fn days_used_in_window<'a, I>(
    reference: NaiveDate,
    intervals: I,
    rule: &WindowRule,
) -> WindowUsage
where
    I: IntoIterator<Item = &'a Interval>,
{
    let window = rule.window_ending(reference);
    let used: i64 = intervals
        .into_iter()
        .map(|interval| interval.days_within(&window))
        .sum();

    WindowUsage {
        window,
        used,
        remaining: rule.quota() - used,
    }
}

/// [`days_used_in_window`] over the counted subset of `stays`.
pub fn stay_usage<'a, I>(reference: NaiveDate, stays: I, rule: &WindowRule) -> WindowUsage
where
    I: IntoIterator<Item = &'a Stay>,
{
    days_used_in_window(reference, counted_intervals(stays), rule)
}

// ── overstay_report ─────────────────────────────────────────────────────────

/// Whether recorded stays exceed the quota as of a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverstayReport {
    pub window: Window,
    pub days_used: i64,
    /// Signed remaining days, as in [`WindowUsage::remaining`].
    pub days_remaining: i64,
    /// Days beyond the quota, zero when compliant.
    pub days_over: i64,
    pub is_overstay: bool,
}

/// Summarise the window ending at `reference` for display: usage, remaining
/// quota, and how far over the limit the traveller is.
pub fn overstay_report(reference: NaiveDate, stays: &[Stay], rule: &WindowRule) -> OverstayReport {
    let usage = stay_usage(reference, stays, rule);
    OverstayReport {
        window: usage.window,
        days_used: usage.used,
        days_remaining: usage.remaining,
        days_over: (-usage.remaining).max(0),
        is_overstay: usage.is_over_quota(),
    }
}
