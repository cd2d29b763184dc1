// src/db/section_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::layout::{CreateSectionPayload, Section, UpdateSectionPayload},
};

const SECTION_CONFLICT: &str = "Section code already exists on this floor";

const SCOPED_SELECT: &str = r#"
    SELECT sc.*
    FROM sections sc
    INNER JOIN floors f ON f.id = sc.floor_id
    INNER JOIN branches b ON b.id = f.branch_id
    WHERE TRUE
"#;

#[derive(Clone)]
pub struct SectionRepository {
    pool: PgPool,
}

impl SectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: &TenantScope, floor_id: Option<Uuid>) -> Result<Vec<Section>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SCOPED_SELECT);
        if let Some(floor_id) = floor_id {
            qb.push(" AND sc.floor_id = ").push_bind(floor_id);
        }
        scope.push_ownership(&mut qb, "b");
        qb.push(" ORDER BY f.floor_number, sc.section_code");

        let sections = qb.build_query_as::<Section>().fetch_all(&self.pool).await?;
        Ok(sections)
    }

    pub async fn find_scoped<'e, E>(&self, executor: E, scope: &TenantScope, id: Uuid) -> Result<Option<Section>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SCOPED_SELECT);
        qb.push(" AND sc.id = ").push_bind(id);
        scope.push_ownership(&mut qb, "b");

        let section = qb.build_query_as::<Section>().fetch_optional(executor).await?;
        Ok(section)
    }

    /// Filial dona da seção (usada para travar a filial antes de validar unicidade de bancas).
    pub async fn branch_of<'e, E>(&self, executor: E, section_id: Uuid) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branch_id = sqlx::query_scalar(
            r#"
            SELECT f.branch_id
            FROM sections sc
            INNER JOIN floors f ON f.id = sc.floor_id
            WHERE sc.id = $1
            "#,
        )
        .bind(section_id)
        .fetch_optional(executor)
        .await?;
        Ok(branch_id)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateSectionPayload) -> Result<Section, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Section>(
            r#"
            INSERT INTO sections (floor_id, section_name, section_code, description, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(payload.floor_id)
        .bind(&payload.section_name)
        .bind(&payload.section_code)
        .bind(&payload.description)
        .bind(payload.status)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, SECTION_CONFLICT))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateSectionPayload) -> Result<Section, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE sections SET updated_at = NOW()");
        if let Some(name) = &payload.section_name {
            qb.push(", section_name = ").push_bind(name.clone());
        }
        if let Some(code) = &payload.section_code {
            qb.push(", section_code = ").push_bind(code.clone());
        }
        if let Some(description) = &payload.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = payload.status {
            qb.push(", status = ").push_bind(status);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Section>()
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_unique_violation(e, SECTION_CONFLICT))
    }

    pub async fn count_stalls<'e, E>(&self, executor: E, section_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stalls WHERE section_id = $1")
            .bind(section_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
