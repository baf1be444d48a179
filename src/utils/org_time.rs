//! Day-boundary and lateness rules in the organization's timezone.
//!
//! Both the check-in workflow and the query filters go through here so that
//! "which day is it" has exactly one answer.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::AppError;
use crate::model::attendance::AttendanceStatus;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_CUTOFF_MINUTES: u32 = 8 * 60;

#[derive(Debug, Clone, Copy)]
pub struct OrgCalendar {
    tz: Tz,
    cutoff_minutes: u32,
}

impl OrgCalendar {
    pub fn new(tz: Tz, cutoff_minutes: u32) -> Self {
        Self { tz, cutoff_minutes }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn cutoff_minutes(&self) -> u32 {
        self.cutoff_minutes
    }

    /// The attendance day an instant belongs to.
    pub fn attendance_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    /// Whole minutes since local midnight; seconds are ignored.
    pub fn minutes_since_midnight(&self, at: DateTime<Utc>) -> u32 {
        let local = at.with_timezone(&self.tz);
        local.hour() * 60 + local.minute()
    }

    pub fn status_at(&self, at: DateTime<Utc>) -> AttendanceStatus {
        if self.minutes_since_midnight(at) > self.cutoff_minutes {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        }
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses an inbound `YYYY-MM-DD` date. `field` names the offending
/// parameter in the error message.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::invalid(format!("{} must be a date in YYYY-MM-DD format", field)))
}

/// Parses a `HH:MM` time of day into minutes since midnight.
pub fn parse_cutoff(raw: &str) -> Option<u32> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}
