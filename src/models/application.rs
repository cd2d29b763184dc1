// src/models/application.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::applicant::{BusinessInformation, OtherInformation, Spouse};
use crate::models::status::ApplicationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub stall_id: Uuid,
    pub applicant_id: Uuid,
    pub application_date: NaiveDate,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha de listagem: candidatura + candidato + banca
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListItem {
    pub id: Uuid,
    pub stall_id: Uuid,
    pub applicant_id: Uuid,
    pub application_date: NaiveDate,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub applicant_full_name: String,
    pub applicant_contact_number: String,
    pub applicant_address: Option<String>,
    pub stall_no: String,
    pub stall_location: String,
    pub rental_price: Decimal,
    pub section_name: String,
    pub floor_name: String,
    pub branch_id: Uuid,
    pub branch_name: String,
}

// Detalhe completo (inclui os registros laterais do candidato)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: ApplicationListItem,
    pub applicant_birthdate: Option<NaiveDate>,
    pub applicant_civil_status: Option<String>,
    pub applicant_educational_attainment: Option<String>,
    pub business_information: Option<BusinessInformation>,
    pub spouse: Option<Spouse>,
    pub other_information: Option<OtherInformation>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub status_counts: Vec<StatusCount>,
    pub recent_applications: Vec<ApplicationListItem>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateApplicationPayload {
    pub stall_id: Uuid,
    pub applicant_id: Uuid,
    // Padrão: data de hoje
    pub application_date: Option<NaiveDate>,
}

// O status chega como texto e é validado contra os alvos permitidos,
// para que um valor inválido vire 400 e não um erro de desserialização.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateApplicationStatusPayload {
    #[validate(length(min = 1, message = "Status is required."))]
    pub status: String,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub stall_id: Option<Uuid>,
    pub applicant_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub application_id: Uuid,
    pub stall_id: Uuid,
    pub status: ApplicationStatus,
    pub stall_is_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_filter_parses_status_with_space() {
        let filter: ApplicationFilter =
            serde_json::from_value(serde_json::json!({ "status": "Under Review" })).unwrap();
        assert_eq!(filter.status, Some(ApplicationStatus::UnderReview));
    }

    #[test]
    fn status_payload_accepts_any_text_for_later_validation() {
        let payload: UpdateApplicationStatusPayload =
            serde_json::from_str(r#"{"status":"Archived"}"#).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(ApplicationStatus::parse_transition_target(&payload.status), None);
    }
}
