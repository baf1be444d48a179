use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::attendance::{AttendancePage, AttendanceView, PhotoEvidence};
use crate::service::AttendanceService;
use crate::service::attendance::MAX_NOTE_CHARS;
use crate::service::query::{DateRange, PageRequest};
use crate::utils::upload::UploadStore;
use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use serde::Deserialize;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

/// Multipart body of a check-in.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct CheckInForm {
    /// JPG or PNG photo taken at check-in
    #[schema(value_type = String, format = Binary)]
    pub photo: Vec<u8>,
    /// Optional free-text note, at most 500 characters
    #[schema(example = "Working from the branch office")]
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MyAttendanceQuery {
    /// Page number, starting at 1
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Items per page, 1 to 100
    #[param(example = 20)]
    pub page_size: Option<u32>,
    /// Earliest attendance date (inclusive)
    #[param(example = "2026-01-01")]
    pub from: Option<String>,
    /// Latest attendance date (inclusive)
    #[param(example = "2026-01-31")]
    pub to: Option<String>,
}

#[derive(Default)]
struct CheckInParts {
    photo: Option<PhotoEvidence>,
    note: Option<String>,
}

async fn read_text(mut field: Field, limit: usize) -> Result<String, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if data.len() + chunk.len() > limit {
            return Err(AppError::invalid(format!(
                "note must be at most {} characters",
                MAX_NOTE_CHARS
            )));
        }
        data.extend_from_slice(&chunk);
    }
    String::from_utf8(data).map_err(|_| AppError::invalid("note must be valid UTF-8"))
}

/// Reads the form into `parts`. A photo stored before a later failure stays
/// in `parts` so the caller can discard it.
async fn read_check_in(
    payload: &mut Multipart,
    uploads: &UploadStore,
    parts: &mut CheckInParts,
) -> Result<(), AppError> {
    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_string();
        match name.as_str() {
            "photo" => {
                if parts.photo.is_some() {
                    return Err(AppError::invalid("Only one photo is allowed"));
                }
                parts.photo = Some(uploads.save_field(field).await?);
            }
            "note" => {
                // Four bytes per char covers any UTF-8 note within the limit.
                parts.note = Some(read_text(field, MAX_NOTE_CHARS * 4).await?);
            }
            other => {
                debug!(field = other, "Ignoring unknown multipart field");
                while field.try_next().await?.is_some() {}
            }
        }
    }
    Ok(())
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body(
        content = CheckInForm,
        description = "Photo evidence and optional note",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 201, description = "Checked in", body = AttendanceView),
        (status = 400, description = "Missing or invalid photo, or note too long"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an active employee"),
        (status = 409, description = "Attendance already submitted for today", body = Object, example = json!({
            "error": "CONFLICT",
            "message": "Attendance already submitted for today"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    mut payload: Multipart,
    service: web::Data<AttendanceService>,
    uploads: web::Data<UploadStore>,
) -> Result<HttpResponse, AppError> {
    auth.require_employee()?;
    if auth.employee_id.is_none() {
        return Err(AppError::UnlinkedAccount);
    }

    let mut parts = CheckInParts::default();
    if let Err(e) = read_check_in(&mut payload, &uploads, &mut parts).await {
        if let Some(photo) = &parts.photo {
            uploads.discard(photo).await;
        }
        return Err(e);
    }

    let stored = parts.photo.clone();
    match service.check_in(auth.employee_id, parts.note, parts.photo).await {
        Ok(view) => Ok(HttpResponse::Created().json(view)),
        Err(e) => {
            if let Some(photo) = &stored {
                uploads.discard(photo).await;
            }
            Err(e)
        }
    }
}

/// Own attendance history
#[utoipa::path(
    get,
    path = "/api/attendance/me",
    params(MyAttendanceQuery),
    responses(
        (status = 200, description = "Page of the caller's attendance, newest first", body = AttendancePage),
        (status = 400, description = "Invalid pagination or date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_attendance(
    auth: AuthUser,
    query: web::Query<MyAttendanceQuery>,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    auth.require_employee()?;

    let page = PageRequest::new(query.page, query.page_size)?;
    let range = DateRange::parse("from", query.from.as_deref(), "to", query.to.as_deref())?;

    let result = service.list_own(auth.employee_id, page, range).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Own attendance record by id
#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Attendance record id")
    ),
    responses(
        (status = 200, description = "Attendance record", body = AttendanceView),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_my_attendance(
    auth: AuthUser,
    path: web::Path<u64>,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    auth.require_employee()?;

    let view = service
        .get_own_by_id(auth.employee_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(view))
}
