// src/services/stall_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BranchRepository, SectionRepository, StallRepository},
    middleware::tenancy::TenantScope,
    models::stall::{CreateStallPayload, StallDetail, StallFilter, UpdateStallPayload},
};

pub const STALL_NO_TAKEN: &str = "Stall number already exists in this branch";
pub const STALL_HAS_APPLICATION: &str = "Cannot delete stall with an active application";

#[derive(Clone)]
pub struct StallService {
    branch_repo: BranchRepository,
    section_repo: SectionRepository,
    stall_repo: StallRepository,
    pool: PgPool,
}

impl StallService {
    pub fn new(
        branch_repo: BranchRepository,
        section_repo: SectionRepository,
        stall_repo: StallRepository,
        pool: PgPool,
    ) -> Self {
        Self { branch_repo, section_repo, stall_repo, pool }
    }

    pub async fn list(&self, scope: &TenantScope, filter: &StallFilter) -> Result<Vec<StallDetail>, AppError> {
        self.stall_repo.list(scope, filter).await
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> Result<StallDetail, AppError> {
        self.stall_repo
            .find_scoped(&self.pool, scope, id)
            .await?
            .ok_or(AppError::NotFound("Stall"))
    }

    /// Cria a banca dentro de uma seção do chamador.
    /// A unicidade de `stall_no` vale para a filial inteira.
    pub async fn create(&self, scope: &TenantScope, payload: &CreateStallPayload) -> Result<StallDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. A seção precisa estar no escopo
        self.section_repo
            .find_scoped(&mut *tx, scope, payload.section_id)
            .await?
            .ok_or(AppError::NotFound("Section"))?;

        // 2. Trava a filial dona da seção
        let branch_id = self
            .section_repo
            .branch_of(&mut *tx, payload.section_id)
            .await?
            .ok_or(AppError::NotFound("Section"))?;
        self.branch_repo.lock(&mut *tx, branch_id).await?;

        // 3. Unicidade dentro da filial
        if self
            .stall_repo
            .stall_no_taken(&mut *tx, branch_id, &payload.stall_no, None)
            .await?
        {
            return Err(AppError::Conflict(STALL_NO_TAKEN.into()));
        }

        // 4. Insere e devolve já com a hierarquia resolvida
        let id = self.stall_repo.insert(&mut *tx, payload).await?;
        let stall = self
            .stall_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Stall"))?;

        tx.commit().await?;

        tracing::info!(stall_id = %id, branch_id = %branch_id, stall_no = %payload.stall_no, "Banca criada");
        Ok(stall)
    }

    pub async fn update(&self, scope: &TenantScope, id: Uuid, payload: &UpdateStallPayload) -> Result<StallDetail, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }

        let mut tx = self.pool.begin().await?;

        // 1. Pré-condição: posse
        let current = self
            .stall_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Stall"))?;

        // 2. Mudança de identidade: nova seção no escopo + unicidade na filial de destino
        if payload.touches_identity() {
            let section_id = payload.section_id.unwrap_or(current.section_id);
            if payload.section_id.is_some() {
                self.section_repo
                    .find_scoped(&mut *tx, scope, section_id)
                    .await?
                    .ok_or(AppError::NotFound("Section"))?;
            }

            let branch_id = self
                .section_repo
                .branch_of(&mut *tx, section_id)
                .await?
                .ok_or(AppError::NotFound("Section"))?;
            self.branch_repo.lock(&mut *tx, branch_id).await?;

            let stall_no = payload.stall_no.as_deref().unwrap_or(&current.stall_no);
            if self
                .stall_repo
                .stall_no_taken(&mut *tx, branch_id, stall_no, Some(id))
                .await?
            {
                return Err(AppError::Conflict(STALL_NO_TAKEN.into()));
            }
        }

        // 3. Atualização esparsa
        self.stall_repo.update(&mut *tx, id, payload).await?;
        let stall = self
            .stall_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Stall"))?;

        tx.commit().await?;

        tracing::info!(stall_id = %id, "Banca atualizada");
        Ok(stall)
    }

    pub async fn delete(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.stall_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Stall"))?;

        if self.stall_repo.has_active_application(&mut *tx, id).await? {
            return Err(AppError::BadRequest(STALL_HAS_APPLICATION.into()));
        }

        self.stall_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(stall_id = %id, "Banca removida");
        Ok(())
    }
}
