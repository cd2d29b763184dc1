// src/db/application_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::{
        application::{Application, ApplicationFilter, ApplicationListItem, StatusCount},
        status::ApplicationStatus,
    },
};

pub const DUPLICATE_APPLICATION: &str = "Applicant already has an active application for this stall";

// Candidatura + candidato + banca, com a cadeia até a filial para o escopo
const LIST_SELECT: &str = r#"
    SELECT a.id, a.stall_id, a.applicant_id, a.application_date, a.status, a.created_at,
           ap.full_name AS applicant_full_name,
           ap.contact_number AS applicant_contact_number,
           ap.address AS applicant_address,
           s.stall_no, s.stall_location, s.rental_price,
           sc.section_name, f.floor_name,
           b.id AS branch_id, b.name AS branch_name
    FROM applications a
    INNER JOIN applicants ap ON ap.id = a.applicant_id
    INNER JOIN stalls s ON s.id = a.stall_id
    INNER JOIN sections sc ON sc.id = s.section_id
    INNER JOIN floors f ON f.id = sc.floor_id
    INNER JOIN branches b ON b.id = f.branch_id
    WHERE TRUE
"#;

#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn build_list_query(scope: &TenantScope, filter: &ApplicationFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::<Postgres>::new(LIST_SELECT);
        if let Some(status) = filter.status {
            qb.push(" AND a.status = ").push_bind(status);
        }
        if let Some(stall_id) = filter.stall_id {
            qb.push(" AND a.stall_id = ").push_bind(stall_id);
        }
        if let Some(applicant_id) = filter.applicant_id {
            qb.push(" AND a.applicant_id = ").push_bind(applicant_id);
        }
        scope.push_ownership(&mut qb, "b");
        qb.push(" ORDER BY a.created_at DESC");
        qb
    }

    pub async fn list(&self, scope: &TenantScope, filter: &ApplicationFilter) -> Result<Vec<ApplicationListItem>, AppError> {
        let mut qb = Self::build_list_query(scope, filter);
        let items = qb.build_query_as::<ApplicationListItem>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    pub async fn recent(&self, scope: &TenantScope, limit: i64) -> Result<Vec<ApplicationListItem>, AppError> {
        let mut qb = Self::build_list_query(scope, &ApplicationFilter::default());
        qb.push(" LIMIT ").push_bind(limit);
        let items = qb.build_query_as::<ApplicationListItem>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    pub async fn status_counts(&self, scope: &TenantScope) -> Result<Vec<StatusCount>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT a.status, COUNT(*) AS count
            FROM applications a
            INNER JOIN stalls s ON s.id = a.stall_id
            INNER JOIN sections sc ON sc.id = s.section_id
            INNER JOIN floors f ON f.id = sc.floor_id
            INNER JOIN branches b ON b.id = f.branch_id
            WHERE TRUE
            "#,
        );
        scope.push_ownership(&mut qb, "b");
        qb.push(" GROUP BY a.status ORDER BY a.status");

        let counts = qb.build_query_as::<StatusCount>().fetch_all(&self.pool).await?;
        Ok(counts)
    }

    pub async fn find_scoped<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<Option<ApplicationListItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(LIST_SELECT);
        qb.push(" AND a.id = ").push_bind(id);
        scope.push_ownership(&mut qb, "b");

        let item = qb.build_query_as::<ApplicationListItem>().fetch_optional(executor).await?;
        Ok(item)
    }

    /// Trava a candidatura (somente a linha de `applications`) dentro do escopo.
    pub async fn lock_scoped<'e, E>(&self, executor: E, scope: &TenantScope, id: Uuid) -> Result<Option<Application>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT a.*
            FROM applications a
            INNER JOIN stalls s ON s.id = a.stall_id
            INNER JOIN sections sc ON sc.id = s.section_id
            INNER JOIN floors f ON f.id = sc.floor_id
            INNER JOIN branches b ON b.id = f.branch_id
            WHERE a.id = "#,
        );
        qb.push_bind(id);
        scope.push_ownership(&mut qb, "b");
        qb.push(" FOR UPDATE OF a");

        let application = qb.build_query_as::<Application>().fetch_optional(executor).await?;
        Ok(application)
    }

    pub async fn other_approved_exists<'e, E>(&self, executor: E, stall_id: Uuid, exclude: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applications
                WHERE stall_id = $1 AND status = 'Approved' AND id <> $2
            )
            "#,
        )
        .bind(stall_id)
        .bind(exclude)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    pub async fn active_exists<'e, E>(&self, executor: E, applicant_id: Uuid, stall_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM applications
                WHERE applicant_id = $1 AND stall_id = $2
                  AND status IN {}
            )
            "#,
            ApplicationStatus::active_sql_list()
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(applicant_id)
            .bind(stall_id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        stall_id: Uuid,
        applicant_id: Uuid,
        application_date: Option<NaiveDate>,
    ) -> Result<Application, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (stall_id, applicant_id, application_date)
            VALUES ($1, $2, COALESCE($3, CURRENT_DATE))
            RETURNING *
            "#,
        )
        .bind(stall_id)
        .bind(applicant_id)
        .bind(application_date)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_APPLICATION))
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: ApplicationStatus) -> Result<Application, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await
        // Reabrir uma candidatura pode colidir com outra ativa do mesmo candidato
        .map_err(|e| AppError::from_unique_violation(e, DUPLICATE_APPLICATION))
    }

    /// Bancas com candidatura aprovada deste candidato (precisam ser liberadas se ele sair).
    pub async fn approved_stalls_of_applicant<'e, E>(&self, executor: E, applicant_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stalls = sqlx::query_scalar(
            "SELECT DISTINCT stall_id FROM applications WHERE applicant_id = $1 AND status = 'Approved'",
        )
        .bind(applicant_id)
        .fetch_all(executor)
        .await?;
        Ok(stalls)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_filters_come_before_the_scope() {
        let filter = ApplicationFilter {
            status: Some(ApplicationStatus::Pending),
            ..Default::default()
        };
        let qb = ApplicationRepository::build_list_query(&TenantScope::Manager(Uuid::new_v4()), &filter);
        let sql = qb.sql();
        assert!(sql.contains("a.status = $1"));
        assert!(sql.contains("bm.id = $2"));
        assert!(sql.ends_with("ORDER BY a.created_at DESC"));
    }
}
