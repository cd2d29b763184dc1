// src/models/applicant.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MARRIED: &str = "Married";

// --- 1. Candidato ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub civil_status: Option<String>,
    pub educational_attainment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Registros laterais 1:1 ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessInformation {
    pub applicant_id: Uuid,
    pub nature_of_business: String,
    pub capitalization: Option<Decimal>,
    pub source_of_capital: Option<String>,
    pub previous_business_experience: Option<String>,
    pub relative_stall_owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Spouse {
    pub applicant_id: Uuid,
    pub full_name: String,
    pub birthdate: Option<NaiveDate>,
    pub educational_attainment: Option<String>,
    pub contact_number: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OtherInformation {
    pub applicant_id: Uuid,
    pub signature_ref: Option<String>,
    pub house_sketch_ref: Option<String>,
    pub valid_id_ref: Option<String>,
    pub email_address: Option<String>,
}

// Candidato com tudo o que foi informado
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetail {
    #[serde(flatten)]
    pub applicant: Applicant,
    pub business_information: Option<BusinessInformation>,
    pub spouse: Option<Spouse>,
    pub other_information: Option<OtherInformation>,
}

// Linha da listagem (campos laterais mais usados já resolvidos)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    pub id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    pub address: Option<String>,
    pub civil_status: Option<String>,
    pub nature_of_business: Option<String>,
    pub capitalization: Option<Decimal>,
    pub spouse_full_name: Option<String>,
    pub email_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BusinessInformationInput {
    #[validate(length(min = 1, message = "Nature of business is required."))]
    pub nature_of_business: String,
    pub capitalization: Option<Decimal>,
    pub source_of_capital: Option<String>,
    pub previous_business_experience: Option<String>,
    pub relative_stall_owner: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpouseInput {
    #[validate(length(min = 1, message = "Spouse name is required."))]
    pub full_name: String,
    pub birthdate: Option<NaiveDate>,
    pub educational_attainment: Option<String>,
    pub contact_number: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OtherInformationInput {
    pub signature_ref: Option<String>,
    pub house_sketch_ref: Option<String>,
    pub valid_id_ref: Option<String>,
    #[validate(email(message = "Email is invalid."))]
    pub email_address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateApplicantPayload {
    #[validate(length(min = 1, message = "Applicant name is required."))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Contact number is required."))]
    pub contact_number: String,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub civil_status: Option<String>,
    pub educational_attainment: Option<String>,

    #[validate(nested)]
    pub business_information: Option<BusinessInformationInput>,
    #[validate(nested)]
    pub spouse: Option<SpouseInput>,
    #[validate(nested)]
    pub other_information: Option<OtherInformationInput>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateApplicantPayload {
    #[validate(length(min = 1, message = "Applicant name cannot be empty."))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, message = "Contact number cannot be empty."))]
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub civil_status: Option<String>,
    pub educational_attainment: Option<String>,

    #[validate(nested)]
    pub business_information: Option<BusinessInformationInput>,
    #[validate(nested)]
    pub spouse: Option<SpouseInput>,
    #[validate(nested)]
    pub other_information: Option<OtherInformationInput>,
}

impl UpdateApplicantPayload {
    pub fn has_core_fields(&self) -> bool {
        self.full_name.is_some()
            || self.contact_number.is_some()
            || self.address.is_some()
            || self.birthdate.is_some()
            || self.civil_status.is_some()
            || self.educational_attainment.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_core_fields()
            && self.business_information.is_none()
            && self.spouse.is_none()
            && self.other_information.is_none()
    }
}

/// Dados de cônjuge só são aceitos para candidatos casados.
pub fn validate_spouse_consistency(
    civil_status: Option<&str>,
    spouse: Option<&SpouseInput>,
) -> Result<(), ValidationError> {
    let married = civil_status
        .map(|s| s.trim().eq_ignore_ascii_case(MARRIED))
        .unwrap_or(false);

    if spouse.is_some() && !married {
        let mut err = ValidationError::new("SpouseRequiresMarried");
        err.message = Some("Spouse information is only accepted when civil status is Married.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spouse() -> SpouseInput {
        SpouseInput {
            full_name: "Jose Cruz".into(),
            birthdate: None,
            educational_attainment: None,
            contact_number: None,
            occupation: None,
        }
    }

    #[test]
    fn spouse_requires_married_status() {
        assert!(validate_spouse_consistency(Some("Single"), Some(&spouse())).is_err());
        assert!(validate_spouse_consistency(None, Some(&spouse())).is_err());
        assert!(validate_spouse_consistency(Some("married"), Some(&spouse())).is_ok());
        assert!(validate_spouse_consistency(Some("Single"), None).is_ok());
    }

    #[test]
    fn nested_side_records_are_validated() {
        let payload: CreateApplicantPayload = serde_json::from_value(serde_json::json!({
            "fullName": "Ana Cruz",
            "contactNumber": "09171234567",
            "businessInformation": { "natureOfBusiness": "" }
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn flat_legacy_body_is_rejected() {
        let raw = serde_json::json!({
            "applicant_full_name": "Ana Cruz",
            "applicant_contact_number": "09171234567"
        });
        assert!(serde_json::from_value::<CreateApplicantPayload>(raw).is_err());
    }

    #[test]
    fn update_payload_emptiness() {
        assert!(UpdateApplicantPayload::default().is_empty());
        let payload = UpdateApplicantPayload {
            other_information: Some(OtherInformationInput::default()),
            ..Default::default()
        };
        assert!(!payload.is_empty());
        assert!(!payload.has_core_fields());
    }
}
