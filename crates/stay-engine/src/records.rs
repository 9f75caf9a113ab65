//! The persisted form of stays and planned trips.
//!
//! A travel log is JSON with calendar dates written as `YYYY-MM-DD`. Dates
//! with a time or offset are rejected instead of being shifted into some
//! timezone, and so are unknown fields and reversed intervals.
//!
//! ```json
//! {
//!   "stays": [
//!     { "id": "1", "entryDate": "2024-01-01", "exitDate": "2024-01-10",
//!       "stayType": "short", "countryCode": "FR" }
//!   ],
//!   "proposedTrips": [
//!     { "id": "2", "entryDate": "2024-06-01", "exitDate": "2024-06-20" }
//!   ]
//! }
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StayError;
use crate::interval::{Interval, Stay, StayKind};

/// One stay as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StayRecord {
    pub id: String,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    #[serde(default)]
    pub stay_type: StayKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl TryFrom<StayRecord> for Stay {
    type Error = StayError;

    fn try_from(record: StayRecord) -> Result<Self, Self::Error> {
        let id = record.id.trim();
        if id.is_empty() {
            return Err(StayError::InvalidRecord("stay id must not be empty".to_string()));
        }
        let interval = Interval::new(record.entry_date, record.exit_date)?;
        let country_code = record
            .country_code
            .as_deref()
            .map(normalize_country_code)
            .transpose()?
            .flatten();

        Ok(Stay {
            id: id.to_string(),
            interval,
            kind: record.stay_type,
            country_code,
        })
    }
}

impl From<Stay> for StayRecord {
    fn from(stay: Stay) -> Self {
        StayRecord {
            id: stay.id,
            entry_date: stay.interval.entry(),
            exit_date: stay.interval.exit(),
            stay_type: stay.kind,
            country_code: stay.country_code,
        }
    }
}

/// Upper-case a two-letter country code; blank means "not recorded".
pub(crate) fn normalize_country_code(code: &str) -> Result<Option<String>, StayError> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(None);
    }
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(StayError::InvalidRecord(format!(
            "country code must be two letters: '{code}'"
        )));
    }
    Ok(Some(code.to_ascii_uppercase()))
}

// ── TravelLog ───────────────────────────────────────────────────────────────

/// Confirmed stays and planned trips, as loaded from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TravelLog {
    #[serde(default)]
    pub stays: Vec<Stay>,
    #[serde(default)]
    pub proposed_trips: Vec<Stay>,
}

impl TravelLog {
    /// Parse and validate a travel log.
    ///
    /// # Errors
    ///
    /// Returns [`StayError::InvalidRecord`] for malformed JSON, bad dates,
    /// reversed intervals, exempt planned trips, or duplicate planned-trip ids.
    pub fn from_json(json: &str) -> Result<Self, StayError> {
        let log: TravelLog =
            serde_json::from_str(json).map_err(|e| StayError::InvalidRecord(e.to_string()))?;
        log.validate()?;
        Ok(log)
    }

    pub fn to_json_pretty(&self) -> Result<String, StayError> {
        serde_json::to_string_pretty(self).map_err(|e| StayError::InvalidRecord(e.to_string()))
    }

    fn validate(&self) -> Result<(), StayError> {
        let mut seen = HashSet::new();
        for trip in &self.proposed_trips {
            if !trip.is_counted() {
                return Err(StayError::InvalidRecord(format!(
                    "planned trip '{}' cannot be a residence stay",
                    trip.id
                )));
            }
            if !seen.insert(trip.id.as_str()) {
                return Err(StayError::InvalidRecord(format!(
                    "duplicate planned trip id '{}'",
                    trip.id
                )));
            }
        }
        Ok(())
    }

    /// The planned trips, or none when they are hidden from view.
    pub fn visible_proposed(&self, show: bool) -> &[Stay] {
        if show {
            &self.proposed_trips
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_full_log() {
        let json = r#"{
            "stays": [
                {"id": "1", "entryDate": "2024-01-01", "exitDate": "2024-01-10",
                 "stayType": "short", "countryCode": "fr"},
                {"id": "2", "entryDate": "2023-01-01", "exitDate": "2023-12-31",
                 "stayType": "residence"}
            ],
            "proposedTrips": [
                {"id": "3", "entryDate": "2024-06-01", "exitDate": "2024-06-20"}
            ]
        }"#;
        let log = TravelLog::from_json(json).unwrap();
        assert_eq!(log.stays.len(), 2);
        assert_eq!(log.stays[0].country_code.as_deref(), Some("FR"));
        assert_eq!(log.stays[1].kind, StayKind::Exempt);
        assert_eq!(log.proposed_trips[0].kind, StayKind::Counted);
        assert_eq!(log.proposed_trips[0].interval.exit(), date(2024, 6, 20));
    }

    #[test]
    fn test_legacy_stay_type_names() {
        let json = r#"{"stays": [
            {"id": "a", "entryDate": "2024-01-01", "exitDate": "2024-01-02", "stayType": "short_stay"},
            {"id": "b", "entryDate": "2024-01-01", "exitDate": "2024-01-02", "stayType": "long_stay"}
        ]}"#;
        let log = TravelLog::from_json(json).unwrap();
        assert_eq!(log.stays[0].kind, StayKind::Counted);
        assert_eq!(log.stays[1].kind, StayKind::Exempt);
    }

    #[test]
    fn test_instant_timestamps_rejected() {
        let json = r#"{"stays": [
            {"id": "a", "entryDate": "2024-01-01T00:00:00.000Z", "exitDate": "2024-01-02"}
        ]}"#;
        let err = TravelLog::from_json(json).unwrap_err();
        assert!(matches!(err, StayError::InvalidRecord(_)), "got: {err}");
    }

    #[test]
    fn test_reversed_stay_rejected() {
        let json = r#"{"stays": [
            {"id": "a", "entryDate": "2024-01-10", "exitDate": "2024-01-01"}
        ]}"#;
        let err = TravelLog::from_json(json).unwrap_err().to_string();
        assert!(err.contains("before entry date"), "got: {err}");
    }

    #[test]
    fn test_missing_field_rejected() {
        let json = r#"{"stays": [{"id": "a", "entryDate": "2024-01-10"}]}"#;
        let err = TravelLog::from_json(json).unwrap_err().to_string();
        assert!(err.contains("exitDate"), "got: {err}");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"stays": [
            {"id": "a", "entryDate": "2024-01-01", "exitDate": "2024-01-02", "color": "red"}
        ]}"#;
        assert!(TravelLog::from_json(json).is_err());
    }

    #[test]
    fn test_bad_country_code_rejected() {
        let json = r#"{"stays": [
            {"id": "a", "entryDate": "2024-01-01", "exitDate": "2024-01-02", "countryCode": "FRA"}
        ]}"#;
        let err = TravelLog::from_json(json).unwrap_err().to_string();
        assert!(err.contains("country code"), "got: {err}");
    }

    #[test]
    fn test_blank_country_code_is_none() {
        let json = r#"{"proposedTrips": [
            {"id": "a", "entryDate": "2024-01-01", "exitDate": "2024-01-02", "countryCode": ""}
        ]}"#;
        let log = TravelLog::from_json(json).unwrap();
        assert_eq!(log.proposed_trips[0].country_code, None);
        assert!(log.stays.is_empty());
    }

    #[test]
    fn test_exempt_planned_trip_rejected() {
        let json = r#"{"proposedTrips": [
            {"id": "a", "entryDate": "2024-01-01", "exitDate": "2024-01-02", "stayType": "residence"}
        ]}"#;
        let err = TravelLog::from_json(json).unwrap_err().to_string();
        assert!(err.contains("residence"), "got: {err}");
    }

    #[test]
    fn test_duplicate_planned_ids_rejected() {
        let json = r#"{"proposedTrips": [
            {"id": "a", "entryDate": "2024-01-01", "exitDate": "2024-01-02"},
            {"id": "a", "entryDate": "2024-02-01", "exitDate": "2024-02-02"}
        ]}"#;
        let err = TravelLog::from_json(json).unwrap_err().to_string();
        assert!(err.contains("duplicate"), "got: {err}");
    }

    #[test]
    fn test_serialises_plain_dates() {
        let log = TravelLog {
            stays: vec![Stay::confirmed(
                "1",
                Interval::new(date(2024, 1, 1), date(2024, 1, 10)).unwrap(),
                StayKind::Exempt,
            )
            .with_country("de")
            .unwrap()],
            proposed_trips: Vec::new(),
        };
        let json = log.to_json_pretty().unwrap();
        assert!(json.contains(r#""entryDate": "2024-01-01""#), "got: {json}");
        assert!(json.contains(r#""stayType": "residence""#), "got: {json}");
        assert!(json.contains(r#""countryCode": "DE""#), "got: {json}");
        assert_eq!(TravelLog::from_json(&json).unwrap(), log);
    }

    #[test]
    fn test_visible_proposed() {
        let log = TravelLog {
            stays: Vec::new(),
            proposed_trips: vec![Stay::proposed("p", Interval::single_day(date(2024, 1, 1)))],
        };
        assert_eq!(log.visible_proposed(true).len(), 1);
        assert!(log.visible_proposed(false).is_empty());
    }
}
