use std::str::FromStr;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::attendance::{AttendancePage, AttendanceStatus, AttendanceView};
use crate::service::AttendanceService;
use crate::service::query::{AttendanceFilter, DateRange, PageRequest};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceListQuery {
    /// Restrict to one employee
    #[param(example = 1)]
    pub employee_id: Option<u64>,
    /// PRESENT, LATE, LEAVE, SICK or ABSENT
    #[param(example = "LATE")]
    pub status: Option<String>,
    /// Earliest attendance date (inclusive)
    #[param(example = "2026-01-01")]
    pub start_date: Option<String>,
    /// Latest attendance date (inclusive)
    #[param(example = "2026-01-31")]
    pub end_date: Option<String>,
    /// Page number, starting at 1
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Items per page, 1 to 100
    #[param(example = 20)]
    pub page_size: Option<u32>,
}

impl AttendanceListQuery {
    fn filter(&self) -> Result<AttendanceFilter, AppError> {
        if self.employee_id == Some(0) {
            return Err(AppError::invalid("employeeId must be a positive integer"));
        }

        let status = self
            .status
            .as_deref()
            .map(|raw| {
                AttendanceStatus::from_str(raw).map_err(|_| {
                    AppError::invalid(format!(
                        "status must be one of PRESENT, LATE, LEAVE, SICK, ABSENT; got {:?}",
                        raw
                    ))
                })
            })
            .transpose()?;

        let range = DateRange::parse(
            "startDate",
            self.start_date.as_deref(),
            "endDate",
            self.end_date.as_deref(),
        )?;

        Ok(AttendanceFilter::organization(self.employee_id, status, range))
    }
}

/// Attendance across the organization
#[utoipa::path(
    get,
    path = "/api/hr/attendances",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "Page of attendance records, newest first", body = AttendancePage),
        (status = 400, description = "Invalid filter or pagination"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR/Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "HR"
)]
pub async fn list_attendances(
    auth: AuthUser,
    query: web::Query<AttendanceListQuery>,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;

    let filter = query.filter()?;
    let page = PageRequest::new(query.page, query.page_size)?;

    let result = service.list_all(filter, page).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Any attendance record by id
#[utoipa::path(
    get,
    path = "/api/hr/attendances/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record id")
    ),
    responses(
        (status = 200, description = "Attendance record, with the employee's email, department and position", body = AttendanceView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Attendance not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "HR"
)]
pub async fn get_attendance(
    auth: AuthUser,
    path: web::Path<u64>,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    auth.require_hr_or_admin()?;

    let view = service.get_any_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}
