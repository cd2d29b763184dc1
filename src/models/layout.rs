// src/models/layout.rs
// Estrutura física da filial: andares (floors) e seções (sections).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::status::RecordStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub floor_number: i32,
    pub floor_name: String,
    pub description: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub floor_id: Uuid,
    pub section_name: String,
    pub section_code: String,
    pub description: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Floor payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateFloorPayload {
    #[validate(range(min = 0, message = "Floor number cannot be negative."))]
    pub floor_number: i32,
    #[validate(length(min = 1, message = "Floor name is required."))]
    pub floor_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateFloorPayload {
    #[validate(range(min = 0, message = "Floor number cannot be negative."))]
    pub floor_number: Option<i32>,
    #[validate(length(min = 1, message = "Floor name cannot be empty."))]
    pub floor_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<RecordStatus>,
}

impl UpdateFloorPayload {
    pub fn is_empty(&self) -> bool {
        self.floor_number.is_none()
            && self.floor_name.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }
}

// --- Section payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSectionPayload {
    pub floor_id: Uuid,
    #[validate(length(min = 1, message = "Section name is required."))]
    pub section_name: String,
    #[validate(length(min = 1, max = 20, message = "Section code must have 1 to 20 characters."))]
    pub section_code: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: RecordStatus,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSectionPayload {
    #[validate(length(min = 1, message = "Section name cannot be empty."))]
    pub section_name: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Section code must have 1 to 20 characters."))]
    pub section_code: Option<String>,
    pub description: Option<String>,
    pub status: Option<RecordStatus>,
}

impl UpdateSectionPayload {
    pub fn is_empty(&self) -> bool {
        self.section_name.is_none()
            && self.section_code.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SectionQuery {
    pub floor_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_number_must_not_be_negative() {
        let payload: CreateFloorPayload =
            serde_json::from_str(r#"{"floorNumber":-1,"floorName":"Ground"}"#).unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn section_code_is_bounded() {
        let payload: CreateSectionPayload = serde_json::from_value(serde_json::json!({
            "floorId": Uuid::new_v4(),
            "sectionName": "Dry goods",
            "sectionCode": "",
        }))
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("section_code"));
    }

    #[test]
    fn section_update_without_fields_is_empty() {
        let payload: UpdateSectionPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
    }
}
