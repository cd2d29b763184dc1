// src/services/branch_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::BranchRepository,
    models::branch::{
        AssignManagerPayload, Branch, BranchManager, BranchOverview, CreateBranchPayload, UpdateBranchPayload,
    },
    services::auth::hash_password,
};

pub const BRANCH_HAS_STALLS: &str = "Cannot delete branch with existing stalls. Please remove all stalls first.";
pub const BRANCH_HAS_MANAGER: &str = "Branch already has an active manager";

// Operações de filial (somente admin; o papel é checado na rota)
#[derive(Clone)]
pub struct BranchService {
    branch_repo: BranchRepository,
    pool: PgPool,
}

impl BranchService {
    pub fn new(branch_repo: BranchRepository, pool: PgPool) -> Self {
        Self { branch_repo, pool }
    }

    pub async fn list(&self) -> Result<Vec<BranchOverview>, AppError> {
        self.branch_repo.list_overview().await
    }

    pub async fn get(&self, id: Uuid) -> Result<BranchOverview, AppError> {
        self.branch_repo
            .find_overview(id)
            .await?
            .ok_or(AppError::NotFound("Branch"))
    }

    pub async fn create(&self, admin_id: Uuid, payload: &CreateBranchPayload) -> Result<Branch, AppError> {
        let branch = self.branch_repo.create(&self.pool, admin_id, payload).await?;
        tracing::info!(branch_id = %branch.id, admin_id = %admin_id, "Filial criada");
        Ok(branch)
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateBranchPayload) -> Result<Branch, AppError> {
        if payload.is_empty() {
            return Err(AppError::BadRequest("No fields to update".into()));
        }

        let branch = self
            .branch_repo
            .update(&self.pool, id, payload)
            .await?
            .ok_or(AppError::NotFound("Branch"))?;

        tracing::info!(branch_id = %id, "Filial atualizada");
        Ok(branch)
    }

    /// Recusa enquanto existir qualquer banca descendente; sem bancas,
    /// andares, seções e gerentes caem em cascata.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Trava a filial (nenhuma banca nova entra enquanto decidimos)
        self.branch_repo
            .lock(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Branch"))?;

        // 2. Guarda referencial
        let stalls = self.branch_repo.count_stalls(&mut *tx, id).await?;
        if stalls > 0 {
            return Err(AppError::BadRequest(BRANCH_HAS_STALLS.into()));
        }

        // 3. Remove
        self.branch_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(branch_id = %id, "Filial removida");
        Ok(())
    }

    pub async fn assign_manager(&self, branch_id: Uuid, payload: &AssignManagerPayload) -> Result<BranchManager, AppError> {
        // Hash antes da transação (não toca no banco)
        let password_hash = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        self.branch_repo
            .lock(&mut *tx, branch_id)
            .await?
            .ok_or(AppError::NotFound("Branch"))?;

        if self.branch_repo.active_manager(&mut *tx, branch_id).await?.is_some() {
            return Err(AppError::BadRequest(BRANCH_HAS_MANAGER.into()));
        }

        let manager = self
            .branch_repo
            .insert_manager(
                &mut *tx,
                branch_id,
                &payload.username,
                &password_hash,
                &payload.first_name,
                &payload.last_name,
                payload.email.as_deref(),
                payload.contact_number.as_deref(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(branch_id = %branch_id, branch_manager_id = %manager.id, "Gerente atribuído");
        Ok(manager)
    }

    pub async fn deactivate_manager(&self, branch_id: Uuid) -> Result<BranchManager, AppError> {
        let mut tx = self.pool.begin().await?;

        self.branch_repo
            .lock(&mut *tx, branch_id)
            .await?
            .ok_or(AppError::NotFound("Branch"))?;

        let manager = self
            .branch_repo
            .deactivate_manager(&mut *tx, branch_id)
            .await?
            .ok_or(AppError::NotFound("Active branch manager"))?;

        tx.commit().await?;

        tracing::info!(branch_id = %branch_id, branch_manager_id = %manager.id, "Gerente desativado");
        Ok(manager)
    }
}
