// src/models/stall.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::status::RecordStatus;

pub const DEFAULT_PRICE_TYPE: &str = "Fixed Price";

// Banca com os campos de exibição da hierarquia já resolvidos
// (seção -> andar -> filial -> gerente ativo).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StallDetail {
    pub id: Uuid,
    pub section_id: Uuid,
    pub stall_no: String,
    pub stall_location: String,
    pub size: String,
    pub rental_price: Decimal,
    pub price_type: String,
    pub status: RecordStatus,
    pub is_available: bool,
    pub description: Option<String>,
    pub image_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub section_name: String,
    pub section_code: String,
    pub floor_id: Uuid,
    pub floor_name: String,
    pub floor_number: i32,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub area: String,
    pub branch_location: String,
    pub manager_first_name: Option<String>,
    pub manager_last_name: Option<String>,
}

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("The value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateStallPayload {
    pub section_id: Uuid,

    #[validate(length(min = 1, max = 30, message = "Stall number must have 1 to 30 characters."))]
    pub stall_no: String,

    #[validate(length(min = 1, message = "Stall location is required."))]
    pub stall_location: String,

    #[validate(length(min = 1, message = "Size is required."))]
    pub size: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub rental_price: Decimal,

    pub price_type: Option<String>,

    #[serde(default)]
    pub status: RecordStatus,

    pub is_available: Option<bool>,

    pub description: Option<String>,

    pub image_ref: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStallPayload {
    pub section_id: Option<Uuid>,

    #[validate(length(min = 1, max = 30, message = "Stall number must have 1 to 30 characters."))]
    pub stall_no: Option<String>,

    #[validate(length(min = 1, message = "Stall location cannot be empty."))]
    pub stall_location: Option<String>,

    #[validate(length(min = 1, message = "Size cannot be empty."))]
    pub size: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub rental_price: Option<Decimal>,

    pub price_type: Option<String>,
    pub status: Option<RecordStatus>,
    pub is_available: Option<bool>,
    pub description: Option<String>,
    pub image_ref: Option<String>,
}

impl UpdateStallPayload {
    pub fn is_empty(&self) -> bool {
        self.section_id.is_none()
            && self.stall_no.is_none()
            && self.stall_location.is_none()
            && self.size.is_none()
            && self.rental_price.is_none()
            && self.price_type.is_none()
            && self.status.is_none()
            && self.is_available.is_none()
            && self.description.is_none()
            && self.image_ref.is_none()
    }

    /// Mudança em campos que identificam a banca dentro da filial
    /// exige nova verificação de unicidade.
    pub fn touches_identity(&self) -> bool {
        self.stall_no.is_some() || self.section_id.is_some()
    }
}

// ---
// Ordenação e filtros
// ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    #[serde(alias = "default")]
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    pub fn order_by(&self) -> &'static str {
        match self {
            SortOrder::Newest => "s.created_at DESC",
            SortOrder::Oldest => "s.created_at ASC",
            SortOrder::PriceLow => "s.rental_price ASC, s.created_at DESC",
            SortOrder::PriceHigh => "s.rental_price DESC, s.created_at DESC",
        }
    }
}

// Filtros do painel (dentro do escopo do chamador)
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StallFilter {
    pub status: Option<RecordStatus>,
    pub is_available: Option<bool>,
    pub location: Option<String>,
    pub floor_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort_by: SortOrder,
}

pub const LANDING_DEFAULT_LIMIT: i64 = 50;
pub const LANDING_MAX_LIMIT: i64 = 200;

// Filtros da landing page (público, sem escopo)
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LandingFilter {
    pub area: Option<String>,
    pub location: Option<String>,
    pub section: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub sort_by: SortOrder,
    pub limit: Option<i64>,
}

impl LandingFilter {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(LANDING_DEFAULT_LIMIT)
            .clamp(1, LANDING_MAX_LIMIT)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(deny_unknown_fields)]
pub struct AreaQuery {
    pub area: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AreaSummary {
    pub area: String,
    pub stall_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationEntry {
    pub location: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_accepts_the_documented_keys() {
        let parse = |s: &str| serde_json::from_str::<SortOrder>(&format!("\"{s}\""));
        assert_eq!(parse("price-low").unwrap(), SortOrder::PriceLow);
        assert_eq!(parse("price-high").unwrap(), SortOrder::PriceHigh);
        assert_eq!(parse("oldest").unwrap(), SortOrder::Oldest);
        assert_eq!(parse("newest").unwrap(), SortOrder::Newest);
        assert!(parse("random").is_err());
        assert_eq!(SortOrder::default().order_by(), "s.created_at DESC");
    }

    #[test]
    fn negative_rent_is_rejected() {
        let payload = CreateStallPayload {
            section_id: Uuid::new_v4(),
            stall_no: "S-01".into(),
            stall_location: "Corner".into(),
            size: "3x3".into(),
            rental_price: Decimal::from(-5),
            price_type: None,
            status: RecordStatus::Active,
            is_available: None,
            description: None,
            image_ref: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rental_price"));
    }

    #[test]
    fn legacy_field_names_are_rejected() {
        let raw = serde_json::json!({
            "sectionId": Uuid::new_v4(),
            "stallNumber": "S-01",
            "stallLocation": "Corner",
            "size": "3x3",
            "rentalPrice": 1500,
        });
        assert!(serde_json::from_value::<CreateStallPayload>(raw).is_err());
    }

    #[test]
    fn landing_limit_is_clamped() {
        let mut filter = LandingFilter::default();
        assert_eq!(filter.effective_limit(), LANDING_DEFAULT_LIMIT);
        filter.limit = Some(10_000);
        assert_eq!(filter.effective_limit(), LANDING_MAX_LIMIT);
        filter.limit = Some(0);
        assert_eq!(filter.effective_limit(), 1);
    }

    #[test]
    fn identity_changes_are_detected() {
        let payload = UpdateStallPayload {
            stall_no: Some("S-02".into()),
            ..Default::default()
        };
        assert!(payload.touches_identity());
        let payload = UpdateStallPayload {
            size: Some("4x4".into()),
            ..Default::default()
        };
        assert!(!payload.touches_identity());
    }
}
