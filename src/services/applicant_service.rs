// src/services/applicant_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApplicantRepository, ApplicationRepository, StallRepository},
    middleware::tenancy::TenantScope,
    models::applicant::{
        Applicant, ApplicantDetail, ApplicantSummary, CreateApplicantPayload, MARRIED, SpouseInput,
        UpdateApplicantPayload, validate_spouse_consistency,
    },
};

#[derive(Clone)]
pub struct ApplicantService {
    applicant_repo: ApplicantRepository,
    application_repo: ApplicationRepository,
    stall_repo: StallRepository,
    pool: PgPool,
}

fn check_spouse(civil_status: Option<&str>, spouse: Option<&SpouseInput>) -> Result<(), AppError> {
    validate_spouse_consistency(civil_status, spouse).map_err(|e| {
        AppError::BadRequest(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string()),
        )
    })
}

impl ApplicantService {
    pub fn new(
        applicant_repo: ApplicantRepository,
        application_repo: ApplicationRepository,
        stall_repo: StallRepository,
        pool: PgPool,
    ) -> Self {
        Self { applicant_repo, application_repo, stall_repo, pool }
    }

    /// Submissão pública: candidato + registros laterais numa única transação.
    pub async fn create(&self, payload: &CreateApplicantPayload) -> Result<ApplicantDetail, AppError> {
        check_spouse(payload.civil_status.as_deref(), payload.spouse.as_ref())?;

        let mut tx = self.pool.begin().await?;

        let applicant = self.applicant_repo.insert(&mut *tx, payload).await?;

        let business_information = match &payload.business_information {
            Some(input) => Some(self.applicant_repo.upsert_business(&mut *tx, applicant.id, input).await?),
            None => None,
        };
        let spouse = match &payload.spouse {
            Some(input) => Some(self.applicant_repo.upsert_spouse(&mut *tx, applicant.id, input).await?),
            None => None,
        };
        let other_information = match &payload.other_information {
            Some(input) => Some(self.applicant_repo.upsert_other(&mut *tx, applicant.id, input).await?),
            None => None,
        };

        tx.commit().await?;

        tracing::info!(applicant_id = %applicant.id, "Candidato registrado");
        Ok(ApplicantDetail { applicant, business_information, spouse, other_information })
    }

    pub async fn list(&self, scope: &TenantScope) -> Result<Vec<ApplicantSummary>, AppError> {
        self.applicant_repo.list(scope).await
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<ApplicantDetail, AppError> {
        let mut conn = self.pool.acquire().await?;

        let applicant = self
            .applicant_repo
            .find_scoped(&mut *conn, scope, id)
            .await?
            .ok_or(AppError::NotFound("Applicant"))?;

        self.load_detail(&mut conn, applicant).await
    }

    pub async fn update(&self, scope: &TenantScope, id: Uuid, payload: &UpdateApplicantPayload) -> Result<ApplicantDetail, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }

        let mut tx = self.pool.begin().await?;

        // 1. Pré-condição: posse
        let current = self
            .applicant_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Applicant"))?;

        // 2. Cônjuge só para casados (considerando o estado civil resultante)
        let civil_status = payload.civil_status.as_deref().or(current.civil_status.as_deref());
        check_spouse(civil_status, payload.spouse.as_ref())?;

        // 3. Campos principais
        let applicant = if payload.has_core_fields() {
            self.applicant_repo.update(&mut *tx, id, payload).await?
        } else {
            current
        };

        // 4. Registros laterais
        if let Some(input) = &payload.business_information {
            self.applicant_repo.upsert_business(&mut *tx, id, input).await?;
        }
        if let Some(input) = &payload.spouse {
            self.applicant_repo.upsert_spouse(&mut *tx, id, input).await?;
        }
        let still_married = applicant
            .civil_status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(MARRIED));
        if !still_married {
            self.applicant_repo.delete_spouse(&mut *tx, id).await?;
        }
        if let Some(input) = &payload.other_information {
            self.applicant_repo.upsert_other(&mut *tx, id, input).await?;
        }

        let detail = self.load_detail(&mut tx, applicant).await?;
        tx.commit().await?;

        tracing::info!(applicant_id = %id, "Candidato atualizado");
        Ok(detail)
    }

    /// Remove o candidato e suas candidaturas; bancas que ele ocupava voltam a ficar livres.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let stalls = self.application_repo.approved_stalls_of_applicant(&mut *tx, id).await?;

        let deleted = self.applicant_repo.delete(&mut *tx, id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Applicant"));
        }

        for stall_id in &stalls {
            self.stall_repo.refresh_availability(&mut *tx, *stall_id).await?;
        }

        tx.commit().await?;

        tracing::info!(applicant_id = %id, released_stalls = stalls.len(), "Candidato removido");
        Ok(())
    }

    async fn load_detail(&self, conn: &mut PgConnection, applicant: Applicant) -> Result<ApplicantDetail, AppError> {
        let business_information = self.applicant_repo.business(&mut *conn, applicant.id).await?;
        let spouse = self.applicant_repo.spouse(&mut *conn, applicant.id).await?;
        let other_information = self.applicant_repo.other(&mut *conn, applicant.id).await?;

        Ok(ApplicantDetail { applicant, business_information, spouse, other_information })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spouse_for_single_applicant_is_a_bad_request() {
        let spouse = SpouseInput {
            full_name: "Jose".into(),
            birthdate: None,
            educational_attainment: None,
            contact_number: None,
            occupation: None,
        };
        let err = check_spouse(Some("Single"), Some(&spouse)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("Married")));
        assert!(check_spouse(Some("Single"), None).is_ok());
    }
}
