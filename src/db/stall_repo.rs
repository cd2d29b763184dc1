// src/db/stall_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::{
        stall::{CreateStallPayload, DEFAULT_PRICE_TYPE, StallDetail, StallFilter, UpdateStallPayload},
        status::{ApplicationStatus, RecordStatus},
    },
};

// Banca + hierarquia inteira + gerente ativo da filial.
// Termina em "WHERE TRUE" para os filtros entrarem sempre com " AND ...".
pub(crate) const STALL_DETAIL_SELECT: &str = r#"
    SELECT s.id, s.section_id, s.stall_no, s.stall_location, s.size, s.rental_price, s.price_type,
           s.status, s.is_available, s.description, s.image_ref, s.created_at, s.updated_at,
           sc.section_name, sc.section_code,
           f.id AS floor_id, f.floor_name, f.floor_number,
           b.id AS branch_id, b.name AS branch_name, b.area, b.location AS branch_location,
           mgr.first_name AS manager_first_name, mgr.last_name AS manager_last_name
    FROM stalls s
    INNER JOIN sections sc ON sc.id = s.section_id
    INNER JOIN floors f ON f.id = sc.floor_id
    INNER JOIN branches b ON b.id = f.branch_id
    LEFT JOIN branch_managers mgr ON mgr.branch_id = b.id AND mgr.status = 'Active'
    WHERE TRUE
"#;

/// Busca textual e faixa de preço (compartilhado com a landing page).
pub(crate) fn push_search_and_price(
    qb: &mut QueryBuilder<'_, Postgres>,
    search: Option<&str>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
) {
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{term}%");
        qb.push(" AND (s.stall_no ILIKE ").push_bind(pattern.clone());
        qb.push(" OR s.stall_location ILIKE ").push_bind(pattern.clone());
        qb.push(" OR s.description ILIKE ").push_bind(pattern.clone());
        qb.push(" OR sc.section_name ILIKE ").push_bind(pattern);
        qb.push(")");
    }
    if let Some(min) = min_price {
        qb.push(" AND s.rental_price >= ").push_bind(min);
    }
    if let Some(max) = max_price {
        qb.push(" AND s.rental_price <= ").push_bind(max);
    }
}

// Estado mínimo da banca para aceitar candidaturas
#[derive(Debug, Clone, FromRow)]
pub struct StallAvailability {
    pub status: RecordStatus,
    pub is_available: bool,
}

#[derive(Clone)]
pub struct StallRepository {
    pool: PgPool,
}

impl StallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn build_list_query(scope: &TenantScope, filter: &StallFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::<Postgres>::new(STALL_DETAIL_SELECT);

        if let Some(status) = filter.status {
            qb.push(" AND s.status = ").push_bind(status);
        }
        if let Some(available) = filter.is_available {
            qb.push(" AND s.is_available = ").push_bind(available);
        }
        if let Some(location) = filter.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            qb.push(" AND s.stall_location ILIKE ").push_bind(format!("%{location}%"));
        }
        if let Some(floor_id) = filter.floor_id {
            qb.push(" AND f.id = ").push_bind(floor_id);
        }
        if let Some(section_id) = filter.section_id {
            qb.push(" AND sc.id = ").push_bind(section_id);
        }
        if let Some(branch_id) = filter.branch_id {
            qb.push(" AND b.id = ").push_bind(branch_id);
        }
        push_search_and_price(&mut qb, filter.search.as_deref(), filter.min_price, filter.max_price);

        scope.push_ownership(&mut qb, "b");

        qb.push(" ORDER BY ");
        qb.push(filter.sort_by.order_by());
        qb
    }

    pub async fn list(&self, scope: &TenantScope, filter: &StallFilter) -> Result<Vec<StallDetail>, AppError> {
        let mut qb = Self::build_list_query(scope, filter);
        let stalls = qb.build_query_as::<StallDetail>().fetch_all(&self.pool).await?;
        Ok(stalls)
    }

    pub async fn find_scoped<'e, E>(&self, executor: E, scope: &TenantScope, id: Uuid) -> Result<Option<StallDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(STALL_DETAIL_SELECT);
        qb.push(" AND s.id = ").push_bind(id);
        scope.push_ownership(&mut qb, "b");

        let stall = qb.build_query_as::<StallDetail>().fetch_optional(executor).await?;
        Ok(stall)
    }

    /// `stall_no` já usado em alguma banca da filial (opcionalmente ignorando uma banca).
    pub async fn stall_no_taken<'e, E>(
        &self,
        executor: E,
        branch_id: Uuid,
        stall_no: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM stalls s
                INNER JOIN sections sc ON sc.id = s.section_id
                INNER JOIN floors f ON f.id = sc.floor_id
                WHERE f.branch_id = $1
                  AND s.stall_no = $2
                  AND ($3::uuid IS NULL OR s.id <> $3)
            )
            "#,
        )
        .bind(branch_id)
        .bind(stall_no)
        .bind(exclude)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn insert<'e, E>(&self, executor: E, payload: &CreateStallPayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO stalls
                (section_id, stall_no, stall_location, size, rental_price, price_type,
                 status, is_available, description, image_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(payload.section_id)
        .bind(&payload.stall_no)
        .bind(&payload.stall_location)
        .bind(&payload.size)
        .bind(payload.rental_price)
        .bind(payload.price_type.as_deref().unwrap_or(DEFAULT_PRICE_TYPE))
        .bind(payload.status)
        .bind(payload.is_available.unwrap_or(true))
        .bind(&payload.description)
        .bind(&payload.image_ref)
        .fetch_one(executor)
        .await?;
        Ok(id)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateStallPayload) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE stalls SET updated_at = NOW()");
        if let Some(section_id) = payload.section_id {
            qb.push(", section_id = ").push_bind(section_id);
        }
        if let Some(stall_no) = &payload.stall_no {
            qb.push(", stall_no = ").push_bind(stall_no.clone());
        }
        if let Some(location) = &payload.stall_location {
            qb.push(", stall_location = ").push_bind(location.clone());
        }
        if let Some(size) = &payload.size {
            qb.push(", size = ").push_bind(size.clone());
        }
        if let Some(price) = payload.rental_price {
            qb.push(", rental_price = ").push_bind(price);
        }
        if let Some(price_type) = &payload.price_type {
            qb.push(", price_type = ").push_bind(price_type.clone());
        }
        if let Some(status) = payload.status {
            qb.push(", status = ").push_bind(status);
        }
        if let Some(available) = payload.is_available {
            qb.push(", is_available = ").push_bind(available);
        }
        if let Some(description) = &payload.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(image_ref) = &payload.image_ref {
            qb.push(", image_ref = ").push_bind(image_ref.clone());
        }
        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(executor).await?;
        Ok(result.rows_affected())
    }

    pub async fn has_active_application<'e, E>(&self, executor: E, stall_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE stall_id = $1 AND status IN {})",
            ApplicationStatus::active_sql_list()
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(stall_id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM stalls WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Trava a banca e devolve o necessário para aceitar uma candidatura.
    pub async fn lock_availability<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<StallAvailability>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stall = sqlx::query_as::<_, StallAvailability>(
            "SELECT status, is_available FROM stalls WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(stall)
    }

    /// A banca fica disponível exatamente quando não há candidatura aprovada para ela.
    pub async fn refresh_availability<'e, E>(&self, executor: E, stall_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let available: bool = sqlx::query_scalar(
            r#"
            UPDATE stalls
            SET is_available = NOT EXISTS (
                    SELECT 1 FROM applications a
                    WHERE a.stall_id = stalls.id AND a.status = 'Approved'
                ),
                updated_at = NOW()
            WHERE id = $1
            RETURNING is_available
            "#,
        )
        .bind(stall_id)
        .fetch_one(executor)
        .await?;
        Ok(available)
    }
}
