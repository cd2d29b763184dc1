// src/db/account_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AdminCredentials, BranchManagerInfo, ManagerCredentials},
};

// Contas que podem se autenticar (admins e gerentes de filial)
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_active_admin(&self, username: &str) -> Result<Option<AdminCredentials>, AppError> {
        let admin = sqlx::query_as::<_, AdminCredentials>(
            r#"
            SELECT id, username, password_hash, email
            FROM admins
            WHERE username = $1 AND status = 'Active'
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Só encontra gerentes ativos e com filial atribuída.
    pub async fn find_active_manager(&self, username: &str) -> Result<Option<ManagerCredentials>, AppError> {
        let manager = sqlx::query_as::<_, ManagerCredentials>(
            r#"
            SELECT bm.id, bm.username, bm.password_hash, bm.first_name, bm.last_name, bm.email,
                   b.id AS branch_id, b.name AS branch_name, b.area, b.location
            FROM branch_managers bm
            INNER JOIN branches b ON b.id = bm.branch_id
            WHERE bm.username = $1 AND bm.status = 'Active'
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(manager)
    }

    pub async fn admin_exists(&self, username: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM admins WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create_admin<'e, E>(
        &self,
        executor: E,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar(
            r#"
            INSERT INTO admins (username, password_hash, email)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Admin username already exists"))
    }

    pub async fn manager_info(&self, manager_id: Uuid) -> Result<Option<BranchManagerInfo>, AppError> {
        let info = sqlx::query_as::<_, BranchManagerInfo>(
            r#"
            SELECT bm.id AS branch_manager_id, bm.username, bm.first_name, bm.last_name,
                   bm.email, bm.contact_number,
                   b.id AS branch_id, b.name AS branch_name, b.area, b.location, b.address
            FROM branch_managers bm
            INNER JOIN branches b ON b.id = bm.branch_id
            WHERE bm.id = $1 AND bm.status = 'Active'
            "#,
        )
        .bind(manager_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(info)
    }
}
