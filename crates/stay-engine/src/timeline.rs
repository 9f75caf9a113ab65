//! Planning across every proposed trip at once, and the window a timeline
//! view should frame.
//!
//! Planned trips constrain each other: each is evaluated with all the others
//! already booked, and a trip is also flagged when a *later* day of the plan,
//! whose window still contains the trip, goes over the quota.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::feasibility::{evaluate_against, CandidateEvaluation};
use crate::interval::{counted_intervals, Interval, Stay};
use crate::rule::{Window, WindowRule};
use crate::window::days_used_in_window;

// ── evaluate_all_proposed ───────────────────────────────────────────────────

/// Evaluation of one planned trip within the whole plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedEvaluation {
    pub trip: Stay,
    /// The day-by-day scan of the trip's own span.
    pub evaluation: CandidateEvaluation,
    /// First day after the trip, while the trip is still inside that day's
    /// window, on which the plan as a whole goes over the quota.
    pub joint_violation_date: Option<NaiveDate>,
    /// Legal on its own days and never part of a later over-quota window.
    pub compliant: bool,
}

impl ProposedEvaluation {
    pub fn is_compliant(&self) -> bool {
        self.compliant
    }
}

/// Evaluate every planned trip against the confirmed stays and all the other
/// planned trips.
///
/// Results are ordered by entry date; trips with the same entry keep their
/// input order.
pub fn evaluate_all_proposed(
    confirmed: &[Stay],
    proposed: &[Stay],
    rule: &WindowRule,
) -> Vec<ProposedEvaluation> {
    let mut order: Vec<usize> = (0..proposed.len()).collect();
    order.sort_by_key(|&index| proposed[index].interval.entry());

    let plan: Vec<Interval> = counted_intervals(confirmed.iter().chain(proposed))
        .copied()
        .collect();
    let last_planned_day = proposed.iter().map(|trip| trip.interval.exit()).max();

    order
        .into_iter()
        .map(|index| {
            let trip = &proposed[index];
            let others = proposed
                .iter()
                .enumerate()
                .filter(move |(other, _)| *other != index)
                .map(|(_, stay)| stay);
            let evaluation = evaluate_against(&trip.interval, confirmed.iter().chain(others), rule);
            let joint_violation_date = last_planned_day
                .and_then(|last| first_joint_violation(&trip.interval, last, &plan, rule));

            ProposedEvaluation {
                trip: trip.clone(),
                compliant: evaluation.legal && joint_violation_date.is_none(),
                evaluation,
                joint_violation_date,
            }
        })
        .collect()
}

/// First day in `(trip.exit, min(trip.exit + window - 1, last_day)]` on which
/// occupancy over `plan` exceeds the quota.
fn first_joint_violation(
    trip: &Interval,
    last_day: NaiveDate,
    plan: &[Interval],
    rule: &WindowRule,
) -> Option<NaiveDate> {
    let reach = trip
        .exit()
        .checked_add_days(Days::new(u64::from(rule.window_days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MAX)
        .min(last_day);
    let first = trip.exit().succ_opt()?;

    let violation = Interval::new(first, reach)
        .ok()?
        .days()
        .find(|day| days_used_in_window(*day, plan, rule).is_over_quota());
    if let Some(day) = violation {
        debug!(
            entry = %trip.entry(),
            exit = %trip.exit(),
            %day,
            "trip is part of a later overstay"
        );
    }
    violation
}

// ── compute_display_window ──────────────────────────────────────────────────

/// The window a timeline should frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayWindow {
    pub window: Window,
    /// Latest planned exit, or the reference date when nothing is planned.
    pub anchor: NaiveDate,
    /// The day before the first over-quota day of the plan, when there is one.
    pub last_legal_date: Option<NaiveDate>,
}

impl DisplayWindow {
    /// The plan goes over the quota before reaching the anchor.
    pub fn has_excess(&self) -> bool {
        self.last_legal_date.is_some()
    }
}

/// Frame the window on the last legal day of the plan, or on the anchor when
/// the whole plan is legal.
pub fn compute_display_window(
    confirmed: &[Stay],
    proposed: &[Stay],
    reference: NaiveDate,
    rule: &WindowRule,
) -> DisplayWindow {
    let plan: Vec<Interval> = counted_intervals(confirmed.iter().chain(proposed))
        .copied()
        .collect();
    let anchor = proposed
        .iter()
        .map(|trip| trip.interval.exit())
        .max()
        .unwrap_or(reference);

    let last_legal_date = proposed
        .iter()
        .map(|trip| trip.interval.entry())
        .min()
        .and_then(|earliest| Interval::new(earliest, anchor).ok())
        .and_then(|span| {
            span.days()
                .find(|day| days_used_in_window(*day, &plan, rule).is_over_quota())
        })
        .and_then(|first_over| first_over.pred_opt());

    DisplayWindow {
        window: rule.window_ending(last_legal_date.unwrap_or(anchor)),
        anchor,
        last_legal_date,
    }
}

// ── timeline_extent ─────────────────────────────────────────────────────────

/// First and last day a timeline needs to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimelineExtent {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64,
}

/// The range covering every stay, every planned trip and the reference date.
pub fn timeline_extent(
    confirmed: &[Stay],
    proposed: &[Stay],
    reference: NaiveDate,
) -> TimelineExtent {
    let (start, end) = confirmed
        .iter()
        .chain(proposed)
        .fold((reference, reference), |(start, end), stay| {
            (
                start.min(stay.interval.entry()),
                end.max(stay.interval.exit()),
            )
        });

    TimelineExtent {
        start,
        end,
        total_days: (end - start).num_days() + 1,
    }
}

// ── summarize_timeline ──────────────────────────────────────────────────────

/// Everything a timeline view renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSummary {
    pub display: DisplayWindow,
    pub extent: TimelineExtent,
    pub proposed: Vec<ProposedEvaluation>,
    /// Peak of the first over-quota planned trip, or occupancy on the anchor
    /// day when every trip is legal.
    pub days_used: i64,
    /// `quota - days_used`, negative on an overstay.
    pub days_left: i64,
}

/// Build the timeline view of confirmed stays and planned trips.
pub fn summarize_timeline(
    confirmed: &[Stay],
    proposed: &[Stay],
    reference: NaiveDate,
    rule: &WindowRule,
) -> TimelineSummary {
    let display = compute_display_window(confirmed, proposed, reference, rule);
    let extent = timeline_extent(confirmed, proposed, reference);
    let evaluations = evaluate_all_proposed(confirmed, proposed, rule);

    let days_used = evaluations
        .iter()
        .find(|result| !result.evaluation.legal)
        .map(|result| result.evaluation.max_used)
        .unwrap_or_else(|| {
            let plan = counted_intervals(confirmed.iter().chain(proposed));
            days_used_in_window(display.anchor, plan, rule).used
        });

    TimelineSummary {
        display,
        extent,
        proposed: evaluations,
        days_used,
        days_left: rule.quota() - days_used,
    }
}
