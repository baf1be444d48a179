use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee master data as far as attendance needs it. Lifecycle is owned by
/// employee management; this crate only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: u64,
    pub employee_code: String,
    pub full_name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
}

impl Employee {
    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            id: self.id,
            employee_code: self.employee_code.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
            position: self.position.clone(),
        }
    }
}

/// Employee as embedded in attendance views. The contact and placement
/// fields are only rendered on the administrative detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "employeeCode": "EMP001",
    "fullName": "Nabil Siregar",
    "email": "nabil.siregar@example.com",
    "department": "Finance",
    "position": "Accountant"
}))]
pub struct EmployeeSummary {
    pub id: u64,
    pub employee_code: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl EmployeeSummary {
    /// Drops everything but the identifying fields.
    pub fn brief(self) -> Self {
        Self {
            email: None,
            department: None,
            position: None,
            ..self
        }
    }
}
