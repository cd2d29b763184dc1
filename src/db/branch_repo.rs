// src/db/branch_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::branch::{Branch, BranchManager, BranchOverview, CreateBranchPayload, UpdateBranchPayload},
};

const BRANCH_CONFLICT: &str = "A branch with this name or area/location already exists";

// Filial + gerente ativo + total de bancas (subconsulta pela cadeia seção -> andar)
const OVERVIEW_SELECT: &str = r#"
    SELECT b.id, b.name, b.area, b.location, b.address, b.contact_number, b.email, b.status,
           bm.id AS branch_manager_id,
           bm.username AS manager_username,
           CASE WHEN bm.id IS NULL THEN NULL ELSE bm.first_name || ' ' || bm.last_name END AS manager_name,
           (SELECT COUNT(*) FROM stalls s
              INNER JOIN sections sc ON sc.id = s.section_id
              INNER JOIN floors f ON f.id = sc.floor_id
             WHERE f.branch_id = b.id) AS stall_count,
           b.created_at
    FROM branches b
    LEFT JOIN branch_managers bm ON bm.branch_id = b.id AND bm.status = 'Active'
"#;

const MANAGER_COLUMNS: &str =
    "id, branch_id, username, first_name, last_name, email, contact_number, status, created_at";

#[derive(Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_overview(&self) -> Result<Vec<BranchOverview>, AppError> {
        let sql = format!("{OVERVIEW_SELECT} ORDER BY b.name");
        let branches = sqlx::query_as::<_, BranchOverview>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    pub async fn find_overview(&self, id: Uuid) -> Result<Option<BranchOverview>, AppError> {
        let sql = format!("{OVERVIEW_SELECT} WHERE b.id = $1");
        let branch = sqlx::query_as::<_, BranchOverview>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(branch)
    }

    /// Trava a linha da filial até o fim da transação.
    /// Serializa operações concorrentes que validam unicidade dentro da filial.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Branch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(branch)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        admin_id: Uuid,
        payload: &CreateBranchPayload,
    ) -> Result<Branch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Branch>(
            r#"
            INSERT INTO branches (admin_id, name, area, location, address, contact_number, email, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(admin_id)
        .bind(&payload.name)
        .bind(&payload.area)
        .bind(&payload.location)
        .bind(&payload.address)
        .bind(&payload.contact_number)
        .bind(&payload.email)
        .bind(payload.status)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, BRANCH_CONFLICT))
    }

    /// Atualização esparsa: só as colunas enviadas entram no SET.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateBranchPayload,
    ) -> Result<Option<Branch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE branches SET updated_at = NOW()");
        if let Some(name) = &payload.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(area) = &payload.area {
            qb.push(", area = ").push_bind(area.clone());
        }
        if let Some(location) = &payload.location {
            qb.push(", location = ").push_bind(location.clone());
        }
        if let Some(address) = &payload.address {
            qb.push(", address = ").push_bind(address.clone());
        }
        if let Some(contact) = &payload.contact_number {
            qb.push(", contact_number = ").push_bind(contact.clone());
        }
        if let Some(email) = &payload.email {
            qb.push(", email = ").push_bind(email.clone());
        }
        if let Some(status) = payload.status {
            qb.push(", status = ").push_bind(status);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Branch>()
            .fetch_optional(executor)
            .await
            .map_err(|e| AppError::from_unique_violation(e, BRANCH_CONFLICT))
    }

    pub async fn count_stalls<'e, E>(&self, executor: E, branch_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM stalls s
            INNER JOIN sections sc ON sc.id = s.section_id
            INNER JOIN floors f ON f.id = sc.floor_id
            WHERE f.branch_id = $1
            "#,
        )
        .bind(branch_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Remove a filial; andares, seções e gerentes caem em cascata.
    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Gerente da filial
    // ---

    pub async fn active_manager<'e, E>(&self, executor: E, branch_id: Uuid) -> Result<Option<BranchManager>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {MANAGER_COLUMNS} FROM branch_managers WHERE branch_id = $1 AND status = 'Active'"
        );
        let manager = sqlx::query_as::<_, BranchManager>(&sql)
            .bind(branch_id)
            .fetch_optional(executor)
            .await?;
        Ok(manager)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_manager<'e, E>(
        &self,
        executor: E,
        branch_id: Uuid,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        email: Option<&str>,
        contact_number: Option<&str>,
    ) -> Result<BranchManager, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO branch_managers
                (branch_id, username, password_hash, first_name, last_name, email, contact_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MANAGER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, BranchManager>(&sql)
            .bind(branch_id)
            .bind(username)
            .bind(password_hash)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(contact_number)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Username already exists"))
    }

    pub async fn deactivate_manager<'e, E>(&self, executor: E, branch_id: Uuid) -> Result<Option<BranchManager>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE branch_managers
            SET status = 'Inactive', updated_at = NOW()
            WHERE branch_id = $1 AND status = 'Active'
            RETURNING {MANAGER_COLUMNS}
            "#
        );
        let manager = sqlx::query_as::<_, BranchManager>(&sql)
            .bind(branch_id)
            .fetch_optional(executor)
            .await?;
        Ok(manager)
    }

    /// Filial à qual o gerente está ativamente atribuído.
    pub async fn branch_of_manager<'e, E>(&self, executor: E, manager_id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branch_id: Option<Option<Uuid>> = sqlx::query_scalar(
            "SELECT branch_id FROM branch_managers WHERE id = $1 AND status = 'Active'",
        )
        .bind(manager_id)
        .fetch_optional(executor)
        .await?;
        Ok(branch_id.flatten())
    }
}
