use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::model::attendance::{
    AttendanceEntry, AttendancePage, AttendanceView, NewAttendance, NewPhoto, PageMeta,
    PhotoEvidence,
};
use crate::model::employee::Employee;
use crate::service::query::{AttendanceFilter, AttendanceScope, DateRange, PageRequest};
use crate::store::{AttendanceStore, EmployeeDirectory, StoreError};
use crate::utils::clock::Clock;
use crate::utils::org_time::OrgCalendar;

pub const MAX_NOTE_CHARS: usize = 500;

fn persistence_failure(context: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |e| {
        error!(error = %e, "{}", context);
        AppError::Internal(format!("{}: {}", context, e))
    }
}

/// Blank notes are stored as absent.
pub fn normalize_note(note: Option<String>) -> Result<Option<String>, AppError> {
    let Some(note) = note else {
        return Ok(None);
    };
    if note.chars().count() > MAX_NOTE_CHARS {
        return Err(AppError::invalid(format!(
            "note must be at most {} characters",
            MAX_NOTE_CHARS
        )));
    }
    if note.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(note))
}

/// Check-in workflow and the two attendance views.
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    employees: Arc<dyn EmployeeDirectory>,
    clock: Arc<dyn Clock>,
    calendar: OrgCalendar,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        employees: Arc<dyn EmployeeDirectory>,
        clock: Arc<dyn Clock>,
        calendar: OrgCalendar,
    ) -> Self {
        Self {
            store,
            employees,
            clock,
            calendar,
        }
    }

    /// Records today's check-in for `employee_id`.
    ///
    /// The existence pre-check only saves work on the common path. The
    /// store's uniqueness constraint is what guarantees one record per
    /// employee per day, and losing that race is reported as the same
    /// conflict.
    #[instrument(name = "attendance_check_in", skip(self, note, evidence))]
    pub async fn check_in(
        &self,
        employee_id: Option<u64>,
        note: Option<String>,
        evidence: Option<PhotoEvidence>,
    ) -> Result<AttendanceView, AppError> {
        let employee_id = employee_id.ok_or(AppError::UnlinkedAccount)?;
        let evidence = evidence.ok_or(AppError::MissingEvidence)?;
        let note = normalize_note(note)?;

        self.active_employee(employee_id).await?;

        let now = self.clock.now();
        let attendance_date = self.calendar.attendance_day(now);
        let status = self.calendar.status_at(now);

        let already = self
            .store
            .exists_for_day(employee_id, attendance_date)
            .await
            .map_err(persistence_failure("Failed to check existing attendance"))?;
        if already {
            info!(%attendance_date, "Check-in rejected: already submitted today");
            return Err(AppError::AlreadyCheckedIn);
        }

        let entry = self
            .store
            .create(NewAttendance {
                employee_id,
                attendance_date,
                check_in_at: now,
                status,
                note,
                photos: vec![NewPhoto::from_evidence(evidence, now)],
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => {
                    warn!(%attendance_date, "Check-in lost a concurrent race for the day");
                    AppError::AlreadyCheckedIn
                }
                other => persistence_failure("Failed to submit attendance")(other),
            })?;

        info!(
            record_id = entry.record.id,
            %attendance_date,
            status = %entry.record.status,
            "Check-in recorded"
        );

        Ok(entry.into())
    }

    /// Self-service history, always restricted to the caller.
    pub async fn list_own(
        &self,
        employee_id: Option<u64>,
        page: PageRequest,
        range: DateRange,
    ) -> Result<AttendancePage, AppError> {
        let employee_id = employee_id.ok_or(AppError::UnlinkedAccount)?;
        self.list(AttendanceFilter::own(employee_id, range), page).await
    }

    /// Administrative listing across all employees.
    pub async fn list_all(
        &self,
        filter: AttendanceFilter,
        page: PageRequest,
    ) -> Result<AttendancePage, AppError> {
        debug_assert_eq!(filter.scope, AttendanceScope::Organization);
        self.list(filter, page).await
    }

    /// Missing records and records of other employees are indistinguishable.
    pub async fn get_own_by_id(
        &self,
        employee_id: Option<u64>,
        id: u64,
    ) -> Result<AttendanceView, AppError> {
        let employee_id = employee_id.ok_or(AppError::UnlinkedAccount)?;
        self.get(id, AttendanceScope::Employee(employee_id))
            .await
            .map(AttendanceView::from)
    }

    /// Administrative detail, including the employee's email, department and
    /// position.
    pub async fn get_any_by_id(&self, id: u64) -> Result<AttendanceView, AppError> {
        self.get(id, AttendanceScope::Organization)
            .await
            .map(AttendanceView::detailed)
    }

    pub async fn linked_employee(&self, employee_id: u64) -> Result<Option<Employee>, AppError> {
        self.employees
            .find_employee(employee_id)
            .await
            .map_err(persistence_failure("Failed to load employee"))
    }

    async fn active_employee(&self, employee_id: u64) -> Result<Employee, AppError> {
        match self.linked_employee(employee_id).await? {
            None => Err(AppError::EmployeeNotFound),
            Some(e) if !e.is_active => Err(AppError::EmployeeInactive),
            Some(e) => Ok(e),
        }
    }

    async fn list(
        &self,
        filter: AttendanceFilter,
        page: PageRequest,
    ) -> Result<AttendancePage, AppError> {
        let (total, entries) = self
            .store
            .page(&filter, page)
            .await
            .map_err(persistence_failure("Failed to fetch attendance list"))?;

        Ok(AttendancePage {
            data: entries.into_iter().map(AttendanceView::from).collect(),
            meta: PageMeta {
                page: page.page(),
                page_size: page.page_size(),
                total,
            },
        })
    }

    async fn get(&self, id: u64, scope: AttendanceScope) -> Result<AttendanceEntry, AppError> {
        self.store
            .find(id, scope)
            .await
            .map_err(persistence_failure("Failed to fetch attendance"))?
            .ok_or(AppError::NotFound("Attendance not found"))
    }
}
