// src/services/layout_service.rs
// Andares e seções. Toda leitura e escrita passa pelo escopo do chamador.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BranchRepository, FloorRepository, SectionRepository},
    middleware::tenancy::TenantScope,
    models::layout::{
        CreateFloorPayload, CreateSectionPayload, Floor, Section, UpdateFloorPayload, UpdateSectionPayload,
    },
};

pub const FLOOR_HAS_STALLS: &str = "Cannot delete floor with existing stalls. Please remove all stalls first.";
pub const SECTION_HAS_STALLS: &str = "Cannot delete section with existing stalls. Please remove all stalls first.";

#[derive(Clone)]
pub struct LayoutService {
    branch_repo: BranchRepository,
    floor_repo: FloorRepository,
    section_repo: SectionRepository,
    pool: PgPool,
}

impl LayoutService {
    pub fn new(
        branch_repo: BranchRepository,
        floor_repo: FloorRepository,
        section_repo: SectionRepository,
        pool: PgPool,
    ) -> Self {
        Self { branch_repo, floor_repo, section_repo, pool }
    }

    // ---
    // Andares
    // ---

    pub async fn list_floors(&self, scope: &TenantScope) -> Result<Vec<Floor>, AppError> {
        self.floor_repo.list(scope).await
    }

    pub async fn get_floor(&self, scope: &TenantScope, id: Uuid) -> Result<Floor, AppError> {
        self.floor_repo
            .find_scoped(&self.pool, scope, id)
            .await?
            .ok_or(AppError::NotFound("Floor"))
    }

    /// A filial vem do vínculo ativo do gerente, nunca do corpo da requisição.
    pub async fn create_floor(&self, branch_manager_id: Uuid, payload: &CreateFloorPayload) -> Result<Floor, AppError> {
        let mut tx = self.pool.begin().await?;

        let branch_id = self
            .branch_repo
            .branch_of_manager(&mut *tx, branch_manager_id)
            .await?
            .ok_or(AppError::NotFound("Branch"))?;

        let floor = self.floor_repo.create(&mut *tx, branch_id, payload).await?;
        tx.commit().await?;

        tracing::info!(floor_id = %floor.id, branch_id = %branch_id, "Andar criado");
        Ok(floor)
    }

    pub async fn update_floor(&self, scope: &TenantScope, id: Uuid, payload: &UpdateFloorPayload) -> Result<Floor, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }

        let mut tx = self.pool.begin().await?;

        // Pré-condição: posse
        self.floor_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Floor"))?;

        let floor = self.floor_repo.update(&mut *tx, id, payload).await?;
        tx.commit().await?;

        tracing::info!(floor_id = %id, "Andar atualizado");
        Ok(floor)
    }

    pub async fn delete_floor(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let floor = self
            .floor_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Floor"))?;

        self.branch_repo.lock(&mut *tx, floor.branch_id).await?;

        if self.floor_repo.count_stalls(&mut *tx, id).await? > 0 {
            return Err(AppError::BadRequest(FLOOR_HAS_STALLS.into()));
        }

        self.floor_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(floor_id = %id, "Andar removido");
        Ok(())
    }

    // ---
    // Seções
    // ---

    pub async fn list_sections(&self, scope: &TenantScope, floor_id: Option<Uuid>) -> Result<Vec<Section>, AppError> {
        self.section_repo.list(scope, floor_id).await
    }

    pub async fn get_section(&self, scope: &TenantScope, id: Uuid) -> Result<Section, AppError> {
        self.section_repo
            .find_scoped(&self.pool, scope, id)
            .await?
            .ok_or(AppError::NotFound("Section"))
    }

    pub async fn create_section(&self, scope: &TenantScope, payload: &CreateSectionPayload) -> Result<Section, AppError> {
        let mut tx = self.pool.begin().await?;

        // O andar precisa pertencer à filial do gerente
        self.floor_repo
            .find_scoped(&mut *tx, scope, payload.floor_id)
            .await?
            .ok_or(AppError::NotFound("Floor"))?;

        let section = self.section_repo.create(&mut *tx, payload).await?;
        tx.commit().await?;

        tracing::info!(section_id = %section.id, floor_id = %payload.floor_id, "Seção criada");
        Ok(section)
    }

    pub async fn update_section(
        &self,
        scope: &TenantScope,
        id: Uuid,
        payload: &UpdateSectionPayload,
    ) -> Result<Section, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }

        let mut tx = self.pool.begin().await?;

        self.section_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Section"))?;

        let section = self.section_repo.update(&mut *tx, id, payload).await?;
        tx.commit().await?;

        tracing::info!(section_id = %id, "Seção atualizada");
        Ok(section)
    }

    pub async fn delete_section(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.section_repo
            .find_scoped(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound("Section"))?;

        if let Some(branch_id) = self.section_repo.branch_of(&mut *tx, id).await? {
            self.branch_repo.lock(&mut *tx, branch_id).await?;
        }

        if self.section_repo.count_stalls(&mut *tx, id).await? > 0 {
            return Err(AppError::BadRequest(SECTION_HAS_STALLS.into()));
        }

        self.section_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(section_id = %id, "Seção removida");
        Ok(())
    }
}
