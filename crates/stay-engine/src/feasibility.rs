//! Trip feasibility: would a candidate stay break the quota, and if so, when
//! is the last day the traveller could still leave?
//!
//! Occupancy is recomputed for every day of the candidate. A closed form does
//! not exist in general: other stays enter and leave the window part way
//! through the candidate, so occupancy across the span is not unimodal.
//!
//! # Functions
//!
//! - [`evaluate_candidate`] — Scan one candidate against confirmed and other planned stays
//! - [`evaluate_proposed_trip`] — Re-evaluate a stored planned trip, excluding itself by id
//! - [`can_stay_for_duration`] — How many days of a stay starting on a date are legal
//! - [`next_full_entry_date`] — Earliest entry date from which a full stay is legal

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::StayError;
use crate::interval::{counted_intervals, Interval, Stay};
use crate::rule::{EntrySearchOptions, WindowRule};
use crate::window::{days_used_in_window, stay_usage};

// ── evaluate_candidate ──────────────────────────────────────────────────────

/// Outcome of scanning a candidate stay day by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateEvaluation {
    pub entry: NaiveDate,
    pub exit: NaiveDate,
    /// No day of the candidate pushes occupancy over the quota.
    pub legal: bool,
    /// Highest occupancy reached on any day of the candidate.
    pub max_used: i64,
    /// First day on which `max_used` was reached.
    pub max_used_date: NaiveDate,
    /// Occupancy on the exit day.
    pub used_at_exit: i64,
    /// `quota - used_at_exit`; negative when the exit day itself is over.
    pub remaining_after_exit: i64,
    /// Latest day of the candidate whose occupancy is within the quota: the
    /// "leave by" date when the candidate is not legal.
    pub last_eligible_date: Option<NaiveDate>,
    /// First day of the candidate whose occupancy exceeds the quota.
    pub first_violation_date: Option<NaiveDate>,
}

/// Evaluate staying from `entry` to `exit` on top of the confirmed stays and
/// the other planned trips.
///
/// For each day `d` of the candidate, occupancy is computed over every
/// counted confirmed stay, every other planned trip, and the candidate cut
/// short at `d`, as if the traveller left on `d`.
///
/// `other_proposed` must not contain the candidate itself; use
/// [`evaluate_proposed_trip`] to re-evaluate a stored trip.
///
/// # Errors
///
/// Returns [`StayError::InvalidInterval`] if `exit < entry`. Nothing is
/// scanned in that case.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use stay_engine::{evaluate_candidate, Interval, Stay, StayKind, WindowRule};
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
/// // 85 days already used by the end of May.
/// let history = [Stay::confirmed(
///     "spring",
///     Interval::new(d(3, 8), d(5, 31)).unwrap(),
///     StayKind::Counted,
/// )];
/// let result =
///     evaluate_candidate(d(6, 1), d(6, 10), &history, &[], &WindowRule::SHORT_STAY).unwrap();
/// assert!(!result.legal);
/// assert_eq!(result.max_used, 95);
/// assert_eq!(result.last_eligible_date, Some(d(6, 5)));
/// ```
pub fn evaluate_candidate(
    entry: NaiveDate,
    exit: NaiveDate,
    confirmed: &[Stay],
    other_proposed: &[Stay],
    rule: &WindowRule,
) -> Result<CandidateEvaluation, StayError> {
    let candidate = Interval::new(entry, exit)?;
    Ok(evaluate_against(
        &candidate,
        confirmed.iter().chain(other_proposed),
        rule,
    ))
}

/// Re-evaluate the planned trip `trip_id` against the confirmed stays and
/// every other planned trip.
///
/// # Errors
///
/// Returns [`StayError::UnknownTrip`] if no planned trip has that id.
pub fn evaluate_proposed_trip(
    trip_id: &str,
    confirmed: &[Stay],
    proposed: &[Stay],
    rule: &WindowRule,
) -> Result<CandidateEvaluation, StayError> {
    let trip = proposed
        .iter()
        .find(|trip| trip.id == trip_id)
        .ok_or_else(|| StayError::UnknownTrip(format!("'{trip_id}'")))?;

    let others = proposed.iter().filter(|other| other.id != trip_id);
    Ok(evaluate_against(
        &trip.interval,
        confirmed.iter().chain(others),
        rule,
    ))
}

/// Scan `candidate` against the counted subset of `background`.
pub(crate) fn evaluate_against<'a, I>(
    candidate: &Interval,
    background: I,
    rule: &WindowRule,
) -> CandidateEvaluation
where
    I: IntoIterator<Item = &'a Stay>,
{
    let background: Vec<Interval> = counted_intervals(background).copied().collect();
    let quota = rule.quota();

    let mut peak: Option<(i64, NaiveDate)> = None;
    let mut used_at_exit = 0;
    let mut last_eligible_date = None;
    let mut first_violation_date = None;

    for day in candidate.days() {
        let so_far = candidate.truncated_at(day);
        let usage = days_used_in_window(day, background.iter().chain(so_far.as_ref()), rule);
        trace!(%day, used = usage.used, remaining = usage.remaining, "scanned candidate day");

        if peak.is_none_or(|(max, _)| usage.used > max) {
            peak = Some((usage.used, day));
        }
        if usage.used <= quota {
            last_eligible_date = Some(day);
        } else if first_violation_date.is_none() {
            first_violation_date = Some(day);
        }
        used_at_exit = usage.used;
    }

    let (max_used, max_used_date) = peak.unwrap_or((0, candidate.entry()));
    let legal = max_used <= quota;
    debug!(
        entry = %candidate.entry(),
        exit = %candidate.exit(),
        legal,
        max_used,
        used_at_exit,
        "evaluated candidate"
    );

    CandidateEvaluation {
        entry: candidate.entry(),
        exit: candidate.exit(),
        legal,
        max_used,
        max_used_date,
        used_at_exit,
        remaining_after_exit: quota - used_at_exit,
        last_eligible_date,
        first_violation_date,
    }
}

// ── can_stay_for_duration ───────────────────────────────────────────────────

/// Whether a stay of a fixed length starting on a date is legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DurationCheck {
    pub legal: bool,
    pub entry: NaiveDate,
    pub proposed_exit: NaiveDate,
    pub duration_days: u32,
    /// Days that can be spent before the first violating day.
    pub max_legal_days: i64,
    pub first_overstay_date: Option<NaiveDate>,
    /// Confirmed occupancy of the window ending on the entry date.
    pub days_used_on_entry: i64,
}

/// Check a stay of `duration_days` days starting on `entry` against the
/// confirmed stays.
///
/// # Errors
///
/// Returns [`StayError::InvalidInterval`] if `duration_days` is zero or the
/// exit date would fall outside the supported calendar.
pub fn can_stay_for_duration(
    entry: NaiveDate,
    duration_days: u32,
    confirmed: &[Stay],
    rule: &WindowRule,
) -> Result<DurationCheck, StayError> {
    if duration_days == 0 {
        return Err(StayError::InvalidInterval(
            "stay must last at least one day".to_string(),
        ));
    }
    let exit = entry
        .checked_add_days(Days::new(u64::from(duration_days - 1)))
        .ok_or_else(|| {
            StayError::InvalidInterval(format!(
                "a {duration_days}-day stay from {entry} runs past the end of the calendar"
            ))
        })?;

    let evaluation = evaluate_candidate(entry, exit, confirmed, &[], rule)?;
    let max_legal_days = match evaluation.first_violation_date {
        Some(day) => (day - entry).num_days(),
        None => i64::from(duration_days),
    };

    Ok(DurationCheck {
        legal: evaluation.legal,
        entry,
        proposed_exit: exit,
        duration_days,
        max_legal_days,
        first_overstay_date: evaluation.first_violation_date,
        days_used_on_entry: stay_usage(entry, confirmed, rule).used,
    })
}

// ── next_full_entry_date ────────────────────────────────────────────────────

/// The earliest date a full stay can begin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOpportunity {
    pub entry: NaiveDate,
    pub desired_days: u32,
    pub days_used_on_entry: i64,
    pub days_remaining_on_entry: i64,
}

/// Find the earliest entry date on or after `search_from` from which a stay of
/// `options.desired_days` days is legal, trying at most
/// `options.horizon_days` dates.
///
/// Returns `Ok(None)` when no date within the horizon works, including when
/// the remaining entry dates leave no room for the stay before the end of the
/// calendar.
///
/// # Errors
///
/// Returns [`StayError::InvalidInterval`] if `options.desired_days` is zero.
pub fn next_full_entry_date(
    search_from: NaiveDate,
    confirmed: &[Stay],
    rule: &WindowRule,
    options: &EntrySearchOptions,
) -> Result<Option<EntryOpportunity>, StayError> {
    let candidates = search_from
        .iter_days()
        .take(options.horizon_days as usize);

    let last_day_offset = Days::new(u64::from(options.desired_days.saturating_sub(1)));
    for entry in candidates {
        if entry.checked_add_days(last_day_offset).is_none() {
            // Later entries run past the end of the calendar too.
            break;
        }
        let check = can_stay_for_duration(entry, options.desired_days, confirmed, rule)?;
        if check.legal {
            debug!(%entry, desired_days = options.desired_days, "found full entry date");
            return Ok(Some(EntryOpportunity {
                entry,
                desired_days: options.desired_days,
                days_used_on_entry: check.days_used_on_entry,
                days_remaining_on_entry: rule.quota() - check.days_used_on_entry,
            }));
        }
    }

    debug!(
        %search_from,
        horizon_days = options.horizon_days,
        "no full entry date within horizon"
    );
    Ok(None)
}
