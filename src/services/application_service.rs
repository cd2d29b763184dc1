// src/services/application_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApplicantRepository, ApplicationRepository, StallRepository, application_repo::DUPLICATE_APPLICATION},
    middleware::tenancy::TenantScope,
    models::{
        application::{
            Application, ApplicationDetail, ApplicationFilter, ApplicationListItem, ApplicationStats,
            CreateApplicationPayload, StatusChange,
        },
        status::{ApplicationStatus, RecordStatus},
    },
};

pub const RECENT_APPLICATIONS: i64 = 10;
pub const INVALID_STATUS: &str = "Invalid status. Must be one of: Pending, Approved, Rejected, Cancelled";
pub const STALL_UNAVAILABLE: &str = "Stall is not available for application";
pub const STALL_ALREADY_APPROVED: &str = "Stall already has an approved application";

/// Valida o alvo da transição antes de qualquer escrita.
pub fn parse_target_status(raw: &str) -> Result<ApplicationStatus, AppError> {
    ApplicationStatus::parse_transition_target(raw.trim()).ok_or_else(|| AppError::BadRequest(INVALID_STATUS.into()))
}

#[derive(Clone)]
pub struct ApplicationService {
    applicant_repo: ApplicantRepository,
    application_repo: ApplicationRepository,
    stall_repo: StallRepository,
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(
        applicant_repo: ApplicantRepository,
        application_repo: ApplicationRepository,
        stall_repo: StallRepository,
        pool: PgPool,
    ) -> Self {
        Self { applicant_repo, application_repo, stall_repo, pool }
    }

    /// Submissão pública de candidatura.
    pub async fn create(&self, payload: &CreateApplicationPayload) -> Result<Application, AppError> {
        let CreateApplicationPayload { stall_id, applicant_id, application_date } = *payload;

        let mut tx = self.pool.begin().await?;

        // 1. Banca ativa e livre (travada até o commit)
        let stall = self
            .stall_repo
            .lock_availability(&mut *tx, stall_id)
            .await?
            .ok_or(AppError::NotFound("Stall"))?;
        if stall.status != RecordStatus::Active || !stall.is_available {
            return Err(AppError::BadRequest(STALL_UNAVAILABLE.into()));
        }

        // 2. Candidato existe
        if !self.applicant_repo.exists(&mut *tx, applicant_id).await? {
            return Err(AppError::NotFound("Applicant"));
        }

        // 3. Uma candidatura ativa por (candidato, banca)
        if self.application_repo.active_exists(&mut *tx, applicant_id, stall_id).await? {
            return Err(AppError::Conflict(DUPLICATE_APPLICATION.into()));
        }

        // 4. Insere
        let application = self
            .application_repo
            .insert(&mut *tx, stall_id, applicant_id, application_date)
            .await?;
        tx.commit().await?;

        tracing::info!(application_id = %application.id, stall_id = %stall_id, applicant_id = %applicant_id, "Candidatura registrada");
        Ok(application)
    }

    pub async fn list(&self, scope: &TenantScope, filter: &ApplicationFilter) -> Result<Vec<ApplicationListItem>, AppError> {
        self.application_repo.list(scope, filter).await
    }

    pub async fn stats(&self, scope: &TenantScope) -> Result<ApplicationStats, AppError> {
        let status_counts = self.application_repo.status_counts(scope).await?;
        let recent_applications = self.application_repo.recent(scope, RECENT_APPLICATIONS).await?;
        Ok(ApplicationStats { status_counts, recent_applications })
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<ApplicationDetail, AppError> {
        let mut conn = self.pool.acquire().await?;

        let application = self
            .application_repo
            .find_scoped(&mut *conn, scope, id)
            .await?
            .ok_or(AppError::NotFound("Application"))?;

        // O acesso à candidatura já foi validado; o candidato vem sem filtro adicional
        let applicant = self
            .applicant_repo
            .find_scoped(&mut *conn, &TenantScope::Admin, application.applicant_id)
            .await?
            .ok_or(AppError::NotFound("Applicant"))?;
        let business_information = self.applicant_repo.business(&mut *conn, applicant.id).await?;
        let spouse = self.applicant_repo.spouse(&mut *conn, applicant.id).await?;
        let other_information = self.applicant_repo.other(&mut *conn, applicant.id).await?;

        Ok(ApplicationDetail {
            application,
            applicant_birthdate: applicant.birthdate,
            applicant_civil_status: applicant.civil_status,
            applicant_educational_attainment: applicant.educational_attainment,
            business_information,
            spouse,
            other_information,
        })
    }

    /// Muda o status e recalcula a disponibilidade da banca na mesma transação.
    ///
    /// A banca fica indisponível enquanto existir uma candidatura aprovada para ela.
    pub async fn update_status(&self, scope: &TenantScope, id: Uuid, raw_status: &str) -> Result<StatusChange, AppError> {
        // 1. Alvo inválido falha antes de abrir a transação
        let target = parse_target_status(raw_status)?;

        let mut tx = self.pool.begin().await?;

        // 2. Candidatura no escopo, travada
        let application = self
            .application_repo
            .lock_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Application"))?;

        // 3. Trava a banca: aprovações concorrentes para a mesma banca são serializadas
        self.stall_repo.lock_availability(&mut *tx, application.stall_id).await?;

        if target == ApplicationStatus::Approved
            && self
                .application_repo
                .other_approved_exists(&mut *tx, application.stall_id, id)
                .await?
        {
            return Err(AppError::Conflict(STALL_ALREADY_APPROVED.into()));
        }

        // 4. Status + disponibilidade
        let updated = self.application_repo.set_status(&mut *tx, id, target).await?;
        let stall_is_available = self
            .stall_repo
            .refresh_availability(&mut *tx, application.stall_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %id,
            stall_id = %application.stall_id,
            from = application.status.as_str(),
            to = target.as_str(),
            stall_is_available,
            "Status da candidatura alterado"
        );

        Ok(StatusChange {
            application_id: updated.id,
            stall_id: updated.stall_id,
            status: updated.status,
            stall_is_available,
        })
    }

    pub async fn delete(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let application = self
            .application_repo
            .lock_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Application"))?;

        self.stall_repo.lock_availability(&mut *tx, application.stall_id).await?;
        self.application_repo.delete(&mut *tx, id).await?;
        let stall_is_available = self
            .stall_repo
            .refresh_availability(&mut *tx, application.stall_id)
            .await?;

        tx.commit().await?;

        tracing::info!(application_id = %id, stall_id = %application.stall_id, stall_is_available, "Candidatura removida");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_targets_are_checked_before_any_write() {
        assert_eq!(parse_target_status("Approved").unwrap(), ApplicationStatus::Approved);
        assert_eq!(parse_target_status(" Rejected ").unwrap(), ApplicationStatus::Rejected);
        for bad in ["Under Review", "approved", "Archived", ""] {
            let err = parse_target_status(bad).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(ref msg) if msg == INVALID_STATUS), "{bad}");
        }
    }
}
