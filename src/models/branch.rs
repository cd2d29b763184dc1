// src/models/branch.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::status::RecordStatus;

// ---
// 1. Branch (a "Filial" / o tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub area: String,
    pub location: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Filial com o gerente ativo (se houver) já resolvido para exibição
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchOverview {
    pub id: Uuid,
    pub name: String,
    pub area: String,
    pub location: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub status: RecordStatus,
    pub branch_manager_id: Option<Uuid>,
    pub manager_username: Option<String>,
    pub manager_name: Option<String>,
    pub stall_count: i64,
    pub created_at: DateTime<Utc>,
}

// ---
// 2. BranchManager (sem o hash da senha)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchManager {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

// ---
// 3. Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBranchPayload {
    #[validate(length(min = 1, message = "Branch name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Area is required."))]
    pub area: String,
    #[validate(length(min = 1, message = "Location is required."))]
    pub location: String,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    #[validate(email(message = "Email is invalid."))]
    pub email: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBranchPayload {
    #[validate(length(min = 1, message = "Branch name cannot be empty."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Area cannot be empty."))]
    pub area: Option<String>,
    #[validate(length(min = 1, message = "Location cannot be empty."))]
    pub location: Option<String>,
    pub address: Option<String>,
    pub contact_number: Option<String>,
    #[validate(email(message = "Email is invalid."))]
    pub email: Option<String>,
    pub status: Option<RecordStatus>,
}

impl UpdateBranchPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.area.is_none()
            && self.location.is_none()
            && self.address.is_none()
            && self.contact_number.is_none()
            && self.email.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AssignManagerPayload {
    #[validate(length(min = 3, message = "Username must have at least 3 characters."))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required."))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required."))]
    pub last_name: String,
    #[validate(email(message = "Email is invalid."))]
    pub email: Option<String>,
    pub contact_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_branch_requires_identifying_fields() {
        let payload: CreateBranchPayload =
            serde_json::from_str(r#"{"name":"","area":"Naga City","location":"Centro"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert_eq!(payload.status, RecordStatus::Active);
    }

    #[test]
    fn create_branch_rejects_snake_case_aliases() {
        let raw = r#"{"branch_name":"A","area":"B","location":"C"}"#;
        assert!(serde_json::from_str::<CreateBranchPayload>(raw).is_err());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateBranchPayload::default().is_empty());
        let payload: UpdateBranchPayload = serde_json::from_str(r#"{"address":"Rizal St."}"#).unwrap();
        assert!(!payload.is_empty());
    }

    #[test]
    fn assign_manager_validates_password_length() {
        let payload: AssignManagerPayload = serde_json::from_str(
            r#"{"username":"manager1","password":"123","firstName":"Ana","lastName":"Reyes"}"#,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
