// src/db/floor_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::layout::{CreateFloorPayload, Floor, UpdateFloorPayload},
};

const FLOOR_CONFLICT: &str = "Floor number already exists in this branch";

// Todo acesso parte daqui: o andar sempre com a filial no JOIN para o escopo
const SCOPED_SELECT: &str =
    "SELECT f.* FROM floors f INNER JOIN branches b ON b.id = f.branch_id WHERE TRUE";

#[derive(Clone)]
pub struct FloorRepository {
    pool: PgPool,
}

impl FloorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, scope: &TenantScope) -> Result<Vec<Floor>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(SCOPED_SELECT);
        scope.push_ownership(&mut qb, "b");
        qb.push(" ORDER BY b.name, f.floor_number");

        let floors = qb.build_query_as::<Floor>().fetch_all(&self.pool).await?;
        Ok(floors)
    }

    /// Busca com o predicado de posse; fora do escopo = `None`.
    pub async fn find_scoped<'e, E>(&self, executor: E, scope: &TenantScope, id: Uuid) -> Result<Option<Floor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SCOPED_SELECT);
        qb.push(" AND f.id = ").push_bind(id);
        scope.push_ownership(&mut qb, "b");

        let floor = qb.build_query_as::<Floor>().fetch_optional(executor).await?;
        Ok(floor)
    }

    pub async fn create<'e, E>(&self, executor: E, branch_id: Uuid, payload: &CreateFloorPayload) -> Result<Floor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Floor>(
            r#"
            INSERT INTO floors (branch_id, floor_number, floor_name, description, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(branch_id)
        .bind(payload.floor_number)
        .bind(&payload.floor_name)
        .bind(&payload.description)
        .bind(payload.status)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, FLOOR_CONFLICT))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateFloorPayload) -> Result<Floor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE floors SET updated_at = NOW()");
        if let Some(number) = payload.floor_number {
            qb.push(", floor_number = ").push_bind(number);
        }
        if let Some(name) = &payload.floor_name {
            qb.push(", floor_name = ").push_bind(name.clone());
        }
        if let Some(description) = &payload.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(status) = payload.status {
            qb.push(", status = ").push_bind(status);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING *");

        qb.build_query_as::<Floor>()
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_unique_violation(e, FLOOR_CONFLICT))
    }

    pub async fn count_stalls<'e, E>(&self, executor: E, floor_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM stalls s
            INNER JOIN sections sc ON sc.id = s.section_id
            WHERE sc.floor_id = $1
            "#,
        )
        .bind(floor_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM floors WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
