use chrono::NaiveDate;

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::utils::org_time::parse_date;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Who a query is allowed to see. Every filter carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceScope {
    /// Self-service: only this employee's records.
    Employee(u64),
    /// Administrative: every employee.
    Organization,
}

impl AttendanceScope {
    pub fn permits(&self, record: &AttendanceRecord) -> bool {
        match self {
            AttendanceScope::Employee(id) => record.employee_id == *id,
            AttendanceScope::Organization => true,
        }
    }
}

/// Inclusive date-only bounds on `attendance_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn parse(
        from_field: &str,
        from: Option<&str>,
        to_field: &str,
        to: Option<&str>,
    ) -> Result<Self, AppError> {
        let from = from.map(|raw| parse_date(from_field, raw)).transpose()?;
        let to = to.map(|raw| parse_date(to_field, raw)).transpose()?;

        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(AppError::invalid(format!(
                    "{} must not be after {}",
                    from_field, to_field
                )));
            }
        }

        Ok(Self { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub scope: AttendanceScope,
    pub employee_id: Option<u64>,
    pub status: Option<AttendanceStatus>,
    pub range: DateRange,
}

impl AttendanceFilter {
    /// Self-service filter. Only the date range is caller controlled.
    pub fn own(employee_id: u64, range: DateRange) -> Self {
        Self {
            scope: AttendanceScope::Employee(employee_id),
            employee_id: None,
            status: None,
            range,
        }
    }

    pub fn organization(
        employee_id: Option<u64>,
        status: Option<AttendanceStatus>,
        range: DateRange,
    ) -> Self {
        Self {
            scope: AttendanceScope::Organization,
            employee_id,
            status,
            range,
        }
    }

    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.scope.permits(record)
            && self.employee_id.is_none_or(|id| record.employee_id == id)
            && self.status.is_none_or(|s| record.status == s)
            && self.range.contains(record.attendance_date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Out-of-range values are rejected, never clamped.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, AppError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(AppError::invalid("page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::invalid(format!(
                "pageSize must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}
