// src/services/landing_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LandingRepository,
    models::stall::{AreaSummary, LandingFilter, LocationEntry, StallDetail},
};

#[derive(Clone)]
pub struct LandingService {
    landing_repo: LandingRepository,
}

impl LandingService {
    pub fn new(landing_repo: LandingRepository) -> Self {
        Self { landing_repo }
    }

    pub async fn list(&self) -> Result<Vec<StallDetail>, AppError> {
        self.landing_repo.list_open(None).await
    }

    pub async fn get(&self, id: Uuid) -> Result<StallDetail, AppError> {
        self.landing_repo
            .find_active(id)
            .await?
            .ok_or(AppError::NotFound("Stall"))
    }

    pub async fn areas(&self) -> Result<Vec<AreaSummary>, AppError> {
        self.landing_repo.areas().await
    }

    pub async fn by_area(&self, area: Option<&str>) -> Result<Vec<StallDetail>, AppError> {
        let area = required_area(area)?;
        self.landing_repo.list_open(Some(area)).await
    }

    pub async fn locations(&self, area: Option<&str>) -> Result<Vec<LocationEntry>, AppError> {
        let area = required_area(area)?;
        let locations = self.landing_repo.locations(area).await?;

        Ok(locations
            .into_iter()
            .map(|location| LocationEntry { value: location.clone(), location })
            .collect())
    }

    pub async fn filter(&self, filter: &LandingFilter) -> Result<Vec<StallDetail>, AppError> {
        self.landing_repo.filter(filter).await
    }
}

fn required_area(area: Option<&str>) -> Result<&str, AppError> {
    area.map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::BadRequest("Area parameter is required".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_lookups_require_an_area() {
        assert!(matches!(required_area(None), Err(AppError::BadRequest(_))));
        assert!(matches!(required_area(Some("  ")), Err(AppError::BadRequest(_))));
        assert_eq!(required_area(Some(" Naga City ")).unwrap(), "Naga City");
    }
}
