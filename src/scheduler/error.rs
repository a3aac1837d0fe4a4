//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Invalid hour value (must be 0-23)
    InvalidHour { hour: u32 },

    /// No crawl hours configured
    EmptySchedule,

    /// UTC offset outside what a time zone can have
    InvalidOffset { hours: i32 },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHour { hour } => {
                write!(f, "Invalid hour '{hour}'. Must be 0-23")
            }
            Self::EmptySchedule => {
                write!(f, "Crawl schedule has no hours")
            }
            Self::InvalidOffset { hours } => {
                write!(f, "Invalid UTC offset: {hours}h")
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    /// Create an invalid hour error
    pub fn invalid_hour(hour: u32) -> Self {
        Self::InvalidHour { hour }
    }
}
