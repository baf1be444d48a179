use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::employee::EmployeeSummary;
use crate::utils::org_time::format_date;

/// The check-in workflow only ever writes `Present` or `Late`; the other
/// values come from administrative corrections made elsewhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Late,
    Leave,
    Sick,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    /// Calendar day in the organization timezone, not the UTC date.
    pub attendance_date: NaiveDate,
    pub check_in_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AttendancePhoto {
    pub id: u64,
    pub attendance_record_id: u64,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
    pub captured_at: DateTime<Utc>,
}

/// Metadata of a file the upload store has already accepted and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEvidence {
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
}

#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
    pub captured_at: DateTime<Utc>,
}

impl NewPhoto {
    pub fn from_evidence(evidence: PhotoEvidence, captured_at: DateTime<Utc>) -> Self {
        Self {
            file_path: evidence.file_path,
            file_name: evidence.file_name,
            mime_type: evidence.mime_type,
            file_size: evidence.file_size,
            captured_at,
        }
    }
}

/// A record together with the photos created in the same unit of work.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub attendance_date: NaiveDate,
    pub check_in_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub photos: Vec<NewPhoto>,
}

/// A persisted record with its owner summary and evidence, as read back
/// from the store.
#[derive(Debug, Clone)]
pub struct AttendanceEntry {
    pub record: AttendanceRecord,
    pub employee: EmployeeSummary,
    pub photos: Vec<AttendancePhoto>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoView {
    #[schema(example = 12)]
    pub id: u64,
    #[schema(example = "/uploads/attendance/20260111T003012_5f0c.jpg")]
    pub file_path: String,
    #[schema(example = "selfie.jpg")]
    pub file_name: String,
    #[schema(example = "image/jpeg")]
    pub mime_type: String,
    #[schema(example = 123456)]
    pub file_size: u64,
    #[schema(example = "2026-01-11T00:30:12Z", format = "date-time", value_type = String)]
    pub captured_at: DateTime<Utc>,
}

impl From<AttendancePhoto> for PhotoView {
    fn from(photo: AttendancePhoto) -> Self {
        Self {
            id: photo.id,
            file_path: photo.file_path,
            file_name: photo.file_name,
            mime_type: photo.mime_type,
            file_size: photo.file_size,
            captured_at: photo.captured_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "2026-01-11", format = "date", value_type = String)]
    pub attendance_date: String,
    #[schema(example = "2026-01-11T00:30:12Z", format = "date-time", value_type = String)]
    pub check_in_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    #[schema(example = "Working from the branch office", nullable = true)]
    pub note: Option<String>,
    pub employee: EmployeeSummary,
    pub photos: Vec<PhotoView>,
}

impl From<AttendanceEntry> for AttendanceView {
    fn from(entry: AttendanceEntry) -> Self {
        let mut view = Self::detailed(entry);
        view.employee = view.employee.brief();
        view
    }
}

impl AttendanceView {
    /// Keeps the employee's email, department and position.
    pub fn detailed(entry: AttendanceEntry) -> Self {
        let AttendanceEntry {
            record,
            employee,
            photos,
        } = entry;

        Self {
            id: record.id,
            attendance_date: format_date(record.attendance_date),
            check_in_at: record.check_in_at,
            status: record.status,
            note: record.note,
            employee,
            photos: photos.into_iter().map(PhotoView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub page_size: u32,
    #[schema(example = 31)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendancePage {
    pub data: Vec<AttendanceView>,
    pub meta: PageMeta,
}
