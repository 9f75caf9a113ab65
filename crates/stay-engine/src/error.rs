//! Error types for stay-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StayError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Unknown trip: {0}")]
    UnknownTrip(String),
}

pub type Result<T> = std::result::Result<T, StayError>;
