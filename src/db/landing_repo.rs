// src/db/landing_repo.rs
// Consultas públicas da landing page: sem escopo de tenant, só bancas ativas.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::stall_repo::{STALL_DETAIL_SELECT, push_search_and_price},
    models::stall::{AreaSummary, LandingFilter, StallDetail},
};

const ACTIVE_ONLY: &str = " AND s.status = 'Active' AND b.status = 'Active'";
// Listagens públicas só mostram bancas ainda livres
const OPEN_ONLY: &str = " AND s.is_available = TRUE";

#[derive(Clone)]
pub struct LandingRepository {
    pool: PgPool,
}

impl LandingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn build_list_query(area: Option<&str>) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::<Postgres>::new(STALL_DETAIL_SELECT);
        qb.push(ACTIVE_ONLY);
        qb.push(OPEN_ONLY);
        if let Some(area) = area {
            qb.push(" AND b.area = ").push_bind(area.to_owned());
        }
        qb.push(" ORDER BY s.created_at DESC");
        qb
    }

    pub async fn list_open(&self, area: Option<&str>) -> Result<Vec<StallDetail>, AppError> {
        let mut qb = Self::build_list_query(area);
        let stalls = qb.build_query_as::<StallDetail>().fetch_all(&self.pool).await?;
        Ok(stalls)
    }

    pub async fn find_active(&self, id: Uuid) -> Result<Option<StallDetail>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(STALL_DETAIL_SELECT);
        qb.push(ACTIVE_ONLY);
        qb.push(" AND s.id = ").push_bind(id);

        let stall = qb.build_query_as::<StallDetail>().fetch_optional(&self.pool).await?;
        Ok(stall)
    }

    pub async fn areas(&self) -> Result<Vec<AreaSummary>, AppError> {
        let areas = sqlx::query_as::<_, AreaSummary>(
            r#"
            SELECT b.area, COUNT(s.id) AS stall_count
            FROM branches b
            LEFT JOIN floors f ON f.branch_id = b.id
            LEFT JOIN sections sc ON sc.floor_id = f.id
            LEFT JOIN stalls s ON s.section_id = sc.id AND s.status = 'Active'
            WHERE b.status = 'Active'
            GROUP BY b.area
            ORDER BY b.area
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(areas)
    }

    pub async fn locations(&self, area: &str) -> Result<Vec<String>, AppError> {
        let locations = sqlx::query_scalar(
            r#"
            SELECT DISTINCT location
            FROM branches
            WHERE area = $1 AND status = 'Active'
            ORDER BY location
            "#,
        )
        .bind(area)
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    pub(crate) fn build_filter_query(filter: &LandingFilter) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::<Postgres>::new(STALL_DETAIL_SELECT);
        qb.push(ACTIVE_ONLY);
        qb.push(OPEN_ONLY);

        if let Some(area) = filter.area.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            qb.push(" AND b.area = ").push_bind(area.to_owned());
        }
        if let Some(location) = filter.location.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            qb.push(" AND b.location = ").push_bind(location.to_owned());
        }
        if let Some(section) = filter.section.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            qb.push(" AND sc.section_name = ").push_bind(section.to_owned());
        }
        push_search_and_price(&mut qb, filter.search.as_deref(), filter.min_price, filter.max_price);

        qb.push(" ORDER BY ");
        qb.push(filter.sort_by.order_by());
        qb.push(" LIMIT ").push_bind(filter.effective_limit());
        qb
    }

    pub async fn filter(&self, filter: &LandingFilter) -> Result<Vec<StallDetail>, AppError> {
        let mut qb = Self::build_filter_query(filter);
        let stalls = qb.build_query_as::<StallDetail>().fetch_all(&self.pool).await?;
        Ok(stalls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_filter_only_shows_open_stalls_and_is_limited() {
        let filter = LandingFilter {
            area: Some("Naga City".into()),
            limit: Some(500),
            ..Default::default()
        };
        let qb = LandingRepository::build_filter_query(&filter);
        let sql = qb.sql();
        assert!(sql.contains("s.is_available = TRUE"));
        assert!(sql.contains("b.area = $1"));
        assert!(sql.ends_with("LIMIT $2"));
        assert!(!sql.contains("branch_managers bm"));
    }

    #[test]
    fn catalog_listings_hide_rented_stalls() {
        for area in [None, Some("Naga City")] {
            let qb = LandingRepository::build_list_query(area);
            assert!(qb.sql().contains("s.is_available = TRUE"));
            assert!(qb.sql().contains("s.status = 'Active'"));
        }
        assert!(LandingRepository::build_list_query(Some("Naga City")).sql().contains("b.area = $1"));
    }
}
