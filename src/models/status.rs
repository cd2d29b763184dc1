// src/models/status.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Estado genérico de cadastro (contas, filiais, andares, seções, bancas)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "record_status")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

// Ciclo de vida de uma candidatura
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_status")]
pub enum ApplicationStatus {
    Pending,
    #[serde(rename = "Under Review")]
    #[sqlx(rename = "Under Review")]
    UnderReview,
    Approved,
    Rejected,
    Cancelled,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Cancelled => "Cancelled",
        }
    }

    /// Estados que ainda "seguram" a banca para o candidato.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::UnderReview | ApplicationStatus::Approved
        )
    }

    /// Lista SQL `('Pending', ...)` com os estados de `is_active`.
    pub fn active_sql_list() -> String {
        let quoted: Vec<String> = Self::ALL
            .iter()
            .filter(|s| s.is_active())
            .map(|s| format!("'{}'", s.as_str()))
            .collect();
        format!("({})", quoted.join(", "))
    }

    /// Alvos aceitos pelo endpoint de mudança de status.
    /// "Under Review" existe no modelo mas não é um alvo válido.
    pub fn parse_transition_target(value: &str) -> Option<ApplicationStatus> {
        match value {
            "Pending" => Some(ApplicationStatus::Pending),
            "Approved" => Some(ApplicationStatus::Approved),
            "Rejected" => Some(ApplicationStatus::Rejected),
            "Cancelled" => Some(ApplicationStatus::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_four_statuses_are_transition_targets() {
        assert_eq!(ApplicationStatus::parse_transition_target("Approved"), Some(ApplicationStatus::Approved));
        assert_eq!(ApplicationStatus::parse_transition_target("Cancelled"), Some(ApplicationStatus::Cancelled));
        assert_eq!(ApplicationStatus::parse_transition_target("Under Review"), None);
        assert_eq!(ApplicationStatus::parse_transition_target("approved"), None);
        assert_eq!(ApplicationStatus::parse_transition_target(""), None);
    }

    #[test]
    fn active_statuses_hold_the_stall() {
        let active: Vec<_> = ApplicationStatus::ALL.iter().filter(|s| s.is_active()).collect();
        assert_eq!(
            active,
            vec![&ApplicationStatus::Pending, &ApplicationStatus::UnderReview, &ApplicationStatus::Approved]
        );
    }

    #[test]
    fn active_sql_list_matches_the_active_statuses() {
        assert_eq!(
            ApplicationStatus::active_sql_list(),
            "('Pending', 'Under Review', 'Approved')"
        );
    }

    #[test]
    fn under_review_keeps_its_wire_name() {
        let json = serde_json::to_string(&ApplicationStatus::UnderReview).unwrap();
        assert_eq!(json, "\"Under Review\"");
        assert_eq!(ApplicationStatus::UnderReview.as_str(), "Under Review");
    }
}
