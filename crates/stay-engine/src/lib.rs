//! # stay-engine
//!
//! Deterministic rolling-window stay accounting.
//!
//! Answers "how many days have I spent inside the area in the last 180 days,
//! and can I take this trip?" for the short-stay rule of 90 days in any
//! 180-day period, or for any other N-in-M rolling quota configured through
//! [`WindowRule`]. Every function is pure: callers pass the reference date
//! and snapshots of their stays, and get numbers and dates back.
//!
//! ## Modules
//!
//! - [`rule`] — Window length, quota, and search options
//! - [`interval`] — Validated date intervals, stays, and stay kinds
//! - [`window`] — Days used inside the window ending on a reference date
//! - [`feasibility`] — Day-by-day trip scans and last eligible exit dates
//! - [`timeline`] — Whole-plan evaluation and the display window
//! - [`records`] — JSON travel log with strict `YYYY-MM-DD` dates
//! - [`error`] — Error types

pub mod error;
pub mod feasibility;
pub mod interval;
pub mod records;
pub mod rule;
pub mod timeline;
pub mod window;

pub use error::StayError;
pub use feasibility::{
    can_stay_for_duration, evaluate_candidate, evaluate_proposed_trip, next_full_entry_date,
    CandidateEvaluation, DurationCheck, EntryOpportunity,
};
pub use interval::{counted_intervals, Interval, Stay, StayKind};
pub use records::{StayRecord, TravelLog};
pub use rule::{EntrySearchOptions, Window, WindowRule};
pub use timeline::{
    compute_display_window, evaluate_all_proposed, summarize_timeline, timeline_extent,
    DisplayWindow, ProposedEvaluation, TimelineExtent, TimelineSummary,
};
pub use window::{days_used_in_window, overstay_report, stay_usage, OverstayReport, WindowUsage};
