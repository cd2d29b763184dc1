// src/handlers/stalls.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{rbac::RequireManager, tenancy::TenantScope},
    models::stall::{CreateStallPayload, StallDetail, StallFilter, UpdateStallPayload},
};

#[utoipa::path(
    get,
    path = "/api/stalls",
    tag = "Stalls",
    params(StallFilter),
    responses(
        (status = 200, description = "Bancas visíveis ao chamador", body = Vec<StallDetail>),
        (status = 400, description = "Filtro inválido"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_stalls(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<StallFilter>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let stalls = app_state.stall_service.list(&scope, &filter).await?;
    Ok(ApiResponse::list("Stalls retrieved successfully", stalls))
}

#[utoipa::path(
    get,
    path = "/api/stalls/filter",
    tag = "Stalls",
    params(StallFilter),
    responses(
        (status = 200, description = "Bancas filtradas", body = Vec<StallDetail>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn filter_stalls(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<StallFilter>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let stalls = app_state.stall_service.list(&scope, &filter).await?;
    Ok(ApiResponse::list("Stalls filtered successfully", stalls))
}

#[utoipa::path(
    post,
    path = "/api/stalls",
    tag = "Stalls",
    request_body = CreateStallPayload,
    responses(
        (status = 201, description = "Banca criada", body = StallDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Somente gerentes de filial"),
        (status = 404, description = "Seção fora do escopo"),
        (status = 409, description = "Número da banca já existe na filial")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_stall(
    _guard: RequireManager,
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateStallPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let stall = app_state.stall_service.create(&scope, &payload).await?;
    Ok(ApiResponse::created("Stall added successfully", stall))
}

#[utoipa::path(
    get,
    path = "/api/stalls/{id}",
    tag = "Stalls",
    params(("id" = Uuid, Path, description = "ID da banca")),
    responses(
        (status = 200, description = "Banca", body = StallDetail),
        (status = 404, description = "Banca não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stall(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let stall = app_state.stall_service.get(&scope, id).await?;
    Ok(ApiResponse::ok("Stall retrieved successfully", stall))
}

#[utoipa::path(
    put,
    path = "/api/stalls/{id}",
    tag = "Stalls",
    params(("id" = Uuid, Path, description = "ID da banca")),
    request_body = UpdateStallPayload,
    responses(
        (status = 200, description = "Banca atualizada", body = StallDetail),
        (status = 400, description = "Nada para atualizar"),
        (status = 404, description = "Banca não encontrada"),
        (status = 409, description = "Número da banca já existe na filial")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_stall(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateStallPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let stall = app_state.stall_service.update(&scope, id, &payload).await?;
    Ok(ApiResponse::ok("Stall updated successfully", stall))
}

#[utoipa::path(
    delete,
    path = "/api/stalls/{id}",
    tag = "Stalls",
    params(("id" = Uuid, Path, description = "ID da banca")),
    responses(
        (status = 200, description = "Banca removida"),
        (status = 400, description = "A banca tem candidatura ativa"),
        (status = 404, description = "Banca não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_stall(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.stall_service.delete(&scope, id).await?;
    Ok(ApiResponse::<()>::message("Stall deleted successfully"))
}
