use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::service::AttendanceService;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "emp001")]
    pub username: String,
    #[schema(example = "EMPLOYEE")]
    pub role: String,
    #[schema(example = 1, nullable = true)]
    pub employee_id: Option<u64>,
    /// `null` when the account has no employee profile
    #[schema(example = "EMP001", nullable = true)]
    pub employee_code: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: Profile,
}

/// Caller identity
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Caller identity with linked employee code", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn profile(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
) -> Result<HttpResponse, AppError> {
    let employee_code = match auth.employee_id {
        Some(id) => service.linked_employee(id).await?.map(|e| e.employee_code),
        None => None,
    };

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: Profile {
            id: auth.user_id,
            username: auth.username,
            role: auth.role.as_str().to_string(),
            employee_id: auth.employee_id,
            employee_code,
        },
    }))
}
