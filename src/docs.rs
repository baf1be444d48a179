use crate::api::attendance::CheckInForm;
use crate::api::me::{Profile, ProfileResponse};
use crate::model::attendance::{
    AttendancePage, AttendanceStatus, AttendanceView, PageMeta, PhotoView,
};
use crate::model::employee::EmployeeSummary;
use crate::models::{LoginReqDto, LoginResponse, TokenPair, UserIdentity};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance check-in and query service

Employees check in once per day with a photo; HR and admins review attendance across the
organization.

### 🔹 Key Features
- **Check-in**
  - One check-in per employee per organization-local day
  - PRESENT or LATE against the configured cutoff
  - Photo evidence (JPG/PNG) stored with every check-in
- **Self-service history**
  - Paginated, date-filtered, newest first
- **HR view**
  - Filter by employee, status and date range

### 🔐 Security
Protected endpoints require a **JWT Bearer** access token from `/auth/login`.
Refresh tokens are single-use and only accepted by `/auth/refresh` and `/auth/logout`.

### 📦 Response Format
- JSON with camelCase fields; dates as `YYYY-MM-DD`, instants as RFC 3339
- Errors as `{"error": "<KIND>", "message": "..."}`
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,
        crate::api::me::profile,

        crate::api::attendance::check_in,
        crate::api::attendance::my_attendance,
        crate::api::attendance::get_my_attendance,

        crate::api::hr::list_attendances,
        crate::api::hr::get_attendance
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            TokenPair,
            UserIdentity,
            Profile,
            ProfileResponse,
            CheckInForm,
            AttendanceStatus,
            AttendanceView,
            AttendancePage,
            PageMeta,
            PhotoView,
            EmployeeSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, token rotation and caller identity"),
        (name = "Attendance", description = "Employee check-in and own history"),
        (name = "HR", description = "Organization-wide attendance for HR and admins"),
    )
)]
pub struct ApiDoc;

/// Prefix the protected handlers are annotated with.
const DOCUMENTED_PREFIX: &str = "/api";

impl ApiDoc {
    /// The document with protected paths moved under the configured
    /// `API_PREFIX`, so Swagger matches the mounted scope.
    pub fn for_prefix(prefix: &str) -> openapi::OpenApi {
        let prefix = prefix.trim_end_matches('/');
        let mut doc = Self::openapi();
        let paths = std::mem::take(&mut doc.paths.paths);
        doc.paths.paths = paths
            .into_iter()
            .map(|(path, item)| match path.strip_prefix(DOCUMENTED_PREFIX) {
                Some(rest) if rest.starts_with('/') => (format!("{}{}", prefix, rest), item),
                _ => (path, item),
            })
            .collect();
        doc
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
