use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::Display;

use crate::model::attendance::{AttendanceEntry, NewAttendance};
use crate::model::employee::Employee;
use crate::service::query::{AttendanceFilter, AttendanceScope, PageRequest};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// `(employee_id, attendance_date)` is already taken.
    #[display(fmt = "unique constraint violated")]
    UniqueViolation,

    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation;
            }
        }
        StoreError::Database(e)
    }
}

/// Persistence for attendance records and their photos.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn exists_for_day(&self, employee_id: u64, day: NaiveDate) -> Result<bool, StoreError>;

    /// Creates the record and its photos as one unit. A concurrent insert for
    /// the same employee and day surfaces as [`StoreError::UniqueViolation`].
    async fn create(&self, new: NewAttendance) -> Result<AttendanceEntry, StoreError>;

    /// Returns `(total, page)` for the filter, both read from one snapshot.
    async fn page(
        &self,
        filter: &AttendanceFilter,
        page: PageRequest,
    ) -> Result<(u64, Vec<AttendanceEntry>), StoreError>;

    async fn find(
        &self,
        id: u64,
        scope: AttendanceScope,
    ) -> Result<Option<AttendanceEntry>, StoreError>;
}

/// Read side of employee master data.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_employee(&self, id: u64) -> Result<Option<Employee>, StoreError>;
}
