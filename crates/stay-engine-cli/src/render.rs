//! Plain-text output.

use stay_engine::{
    CandidateEvaluation, DurationCheck, EntryOpportunity, EntrySearchOptions, OverstayReport,
    TimelineSummary, WindowRule,
};

const DATE_FORMAT: &str = "%B %-d, %Y";

pub fn status(report: &OverstayReport, rule: &WindowRule) -> String {
    let mut out = format!(
        "Window: {} to {}\nDays used: {}/{}\n",
        report.window.start, report.window.end, report.days_used, rule.quota_days
    );
    if report.is_overstay {
        out.push_str(&format!("Overstay: {} days over the limit", report.days_over));
    } else {
        out.push_str(&format!("Days remaining: {}", report.days_remaining));
    }
    out
}

pub fn candidate(result: &CandidateEvaluation, rule: &WindowRule) -> String {
    if result.legal {
        return format!(
            "Trip {} to {} is legal. Maximum days used during trip: {}/{}. \
             Days remaining after trip: {}",
            result.entry, result.exit, result.max_used, rule.quota_days, result.remaining_after_exit
        );
    }
    let mut out = format!(
        "Trip {} to {} would exceed the {}-day limit. Maximum days during trip: {}/{}.",
        result.entry, result.exit, rule.quota_days, result.max_used, rule.quota_days
    );
    if let Some(last) = result.last_eligible_date {
        out.push_str(&format!(" Last eligible exit date: {}", last.format(DATE_FORMAT)));
    }
    out
}

pub fn plan(summary: &TimelineSummary, rule: &WindowRule) -> String {
    let mut lines = Vec::new();
    for result in &summary.proposed {
        let status = if result.is_compliant() { "ok" } else { "OVER" };
        let mut line = format!(
            "[{status}] {} {} to {}: max {}/{}",
            result.trip.id,
            result.trip.interval.entry(),
            result.trip.interval.exit(),
            result.evaluation.max_used,
            rule.quota_days
        );
        if !result.evaluation.legal {
            if let Some(last) = result.evaluation.last_eligible_date {
                line.push_str(&format!(", leave by {last}"));
            }
        } else if let Some(day) = result.joint_violation_date {
            line.push_str(&format!(", pushes the plan over on {day}"));
        }
        lines.push(line);
    }

    let display = &summary.display;
    lines.push(format!(
        "Window: {} to {}{}",
        display.window.start,
        display.window.end,
        if display.has_excess() { " (last legal day)" } else { "" }
    ));
    lines.push(format!(
        "Timeline: {} to {} ({} days)",
        summary.extent.start, summary.extent.end, summary.extent.total_days
    ));
    lines.push(format!(
        "Days used: {}/{}, days left: {}",
        summary.days_used, rule.quota_days, summary.days_left
    ));
    lines.join("\n")
}

pub fn duration(check: &DurationCheck) -> String {
    match check.first_overstay_date {
        None => format!(
            "A {}-day stay from {} to {} is legal",
            check.duration_days, check.entry, check.proposed_exit
        ),
        Some(day) => format!(
            "A {}-day stay from {} is not legal: only {} days fit, overstay begins {}",
            check.duration_days, check.entry, check.max_legal_days, day
        ),
    }
}

pub fn next_entry(found: Option<&EntryOpportunity>, options: &EntrySearchOptions) -> String {
    match found {
        Some(found) => format!(
            "Earliest entry for a {}-day stay: {} ({} days used, {} remaining on entry)",
            found.desired_days,
            found.entry,
            found.days_used_on_entry,
            found.days_remaining_on_entry
        ),
        None => format!(
            "No entry date within {} days allows a {}-day stay",
            options.horizon_days, options.desired_days
        ),
    }
}
