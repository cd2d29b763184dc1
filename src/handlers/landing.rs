// src/handlers/landing.rs
// Catálogo público: sem autenticação, só bancas e filiais ativas.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::stall::{AreaQuery, AreaSummary, LandingFilter, LocationEntry, StallDetail},
};

#[utoipa::path(
    get,
    path = "/api/landing/stalls",
    tag = "Landing",
    responses((status = 200, description = "Bancas ativas e livres", body = Vec<StallDetail>))
)]
pub async fn list_stalls(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stalls = app_state.landing_service.list().await?;
    Ok(ApiResponse::list("Stalls retrieved successfully", stalls))
}

#[utoipa::path(
    get,
    path = "/api/landing/stalls/{id}",
    tag = "Landing",
    params(("id" = Uuid, Path, description = "ID da banca")),
    responses(
        (status = 200, description = "Banca ativa", body = StallDetail),
        (status = 404, description = "Banca não encontrada ou inativa")
    )
)]
pub async fn get_stall(
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let stall = app_state.landing_service.get(id).await?;
    Ok(ApiResponse::ok("Stall retrieved successfully", stall))
}

#[utoipa::path(
    get,
    path = "/api/landing/stalls/areas",
    tag = "Landing",
    responses((status = 200, description = "Áreas com contagem de bancas", body = Vec<AreaSummary>))
)]
pub async fn list_areas(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let areas = app_state.landing_service.areas().await?;
    Ok(ApiResponse::list("Areas retrieved successfully", areas))
}

#[utoipa::path(
    get,
    path = "/api/landing/stalls/by-area",
    tag = "Landing",
    params(AreaQuery),
    responses(
        (status = 200, description = "Bancas livres da área", body = Vec<StallDetail>),
        (status = 400, description = "Parâmetro area ausente")
    )
)]
pub async fn stalls_by_area(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AreaQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let stalls = app_state.landing_service.by_area(query.area.as_deref()).await?;
    Ok(ApiResponse::list("Stalls retrieved successfully", stalls))
}

#[utoipa::path(
    get,
    path = "/api/landing/stalls/locations",
    tag = "Landing",
    params(AreaQuery),
    responses(
        (status = 200, description = "Localizações distintas da área", body = Vec<LocationEntry>),
        (status = 400, description = "Parâmetro area ausente")
    )
)]
pub async fn locations_by_area(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AreaQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let locations = app_state.landing_service.locations(query.area.as_deref()).await?;
    Ok(ApiResponse::list("Locations retrieved successfully", locations))
}

#[utoipa::path(
    get,
    path = "/api/landing/stalls/filter",
    tag = "Landing",
    params(LandingFilter),
    responses(
        (status = 200, description = "Bancas disponíveis filtradas", body = Vec<StallDetail>),
        (status = 400, description = "Filtro inválido")
    )
)]
pub async fn filter_stalls(
    State(app_state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<LandingFilter>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let stalls = app_state.landing_service.filter(&filter).await?;
    Ok(ApiResponse::list("Stalls filtered successfully", stalls))
}
