// src/handlers/layout.rs
// Andares e seções, sempre dentro do escopo do chamador.

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
    models::layout::{
        CreateFloorPayload, CreateSectionPayload, Floor, Section, SectionQuery, UpdateFloorPayload,
        UpdateSectionPayload,
    },
};

// ---
// Andares
// ---

#[utoipa::path(
    get,
    path = "/api/floors",
    tag = "Layout",
    responses(
        (status = 200, description = "Andares visíveis ao chamador", body = Vec<Floor>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_floors(
    scope: TenantScope,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let floors = app_state.layout_service.list_floors(&scope).await?;
    Ok(ApiResponse::list("Floors retrieved successfully", floors))
}

#[utoipa::path(
    post,
    path = "/api/floors",
    tag = "Layout",
    request_body = CreateFloorPayload,
    responses(
        (status = 201, description = "Andar criado na filial do gerente", body = Floor),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Somente gerentes de filial"),
        (status = 409, description = "Número de andar já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_floor(
    _guard: RequireManager,
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateFloorPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let manager_id = scope.manager_id().ok_or(AppError::InvalidToken)?;
    let floor = app_state.layout_service.create_floor(manager_id, &payload).await?;
    Ok(ApiResponse::created("Floor created successfully", floor))
}

#[utoipa::path(
    get,
    path = "/api/floors/{id}",
    tag = "Layout",
    params(("id" = Uuid, Path, description = "ID do andar")),
    responses(
        (status = 200, description = "Andar", body = Floor),
        (status = 404, description = "Andar não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_floor(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let floor = app_state.layout_service.get_floor(&scope, id).await?;
    Ok(ApiResponse::ok("Floor retrieved successfully", floor))
}

#[utoipa::path(
    put,
    path = "/api/floors/{id}",
    tag = "Layout",
    params(("id" = Uuid, Path, description = "ID do andar")),
    request_body = UpdateFloorPayload,
    responses(
        (status = 200, description = "Andar atualizado", body = Floor),
        (status = 400, description = "Nada para atualizar"),
        (status = 404, description = "Andar não encontrado"),
        (status = 409, description = "Número de andar já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_floor(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateFloorPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let floor = app_state.layout_service.update_floor(&scope, id, &payload).await?;
    Ok(ApiResponse::ok("Floor updated successfully", floor))
}

#[utoipa::path(
    delete,
    path = "/api/floors/{id}",
    tag = "Layout",
    params(("id" = Uuid, Path, description = "ID do andar")),
    responses(
        (status = 200, description = "Andar removido"),
        (status = 400, description = "O andar ainda tem bancas"),
        (status = 404, description = "Andar não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_floor(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.layout_service.delete_floor(&scope, id).await?;
    Ok(ApiResponse::<()>::message("Floor deleted successfully"))
}

// ---
// Seções
// ---

#[utoipa::path(
    get,
    path = "/api/sections",
    tag = "Layout",
    params(SectionQuery),
    responses(
        (status = 200, description = "Seções visíveis ao chamador", body = Vec<Section>),
        (status = 400, description = "Parâmetros inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sections(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<SectionQuery>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let sections = app_state.layout_service.list_sections(&scope, query.floor_id).await?;
    Ok(ApiResponse::list("Sections retrieved successfully", sections))
}

#[utoipa::path(
    post,
    path = "/api/sections",
    tag = "Layout",
    request_body = CreateSectionPayload,
    responses(
        (status = 201, description = "Seção criada", body = Section),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Somente gerentes de filial"),
        (status = 404, description = "Andar fora do escopo"),
        (status = 409, description = "Código de seção já existe no andar")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_section(
    _guard: RequireManager,
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateSectionPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let section = app_state.layout_service.create_section(&scope, &payload).await?;
    Ok(ApiResponse::created("Section created successfully", section))
}

#[utoipa::path(
    get,
    path = "/api/sections/{id}",
    tag = "Layout",
    params(("id" = Uuid, Path, description = "ID da seção")),
    responses(
        (status = 200, description = "Seção", body = Section),
        (status = 404, description = "Seção não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_section(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let section = app_state.layout_service.get_section(&scope, id).await?;
    Ok(ApiResponse::ok("Section retrieved successfully", section))
}

#[utoipa::path(
    put,
    path = "/api/sections/{id}",
    tag = "Layout",
    params(("id" = Uuid, Path, description = "ID da seção")),
    request_body = UpdateSectionPayload,
    responses(
        (status = 200, description = "Seção atualizada", body = Section),
        (status = 400, description = "Nada para atualizar"),
        (status = 404, description = "Seção não encontrada"),
        (status = 409, description = "Código de seção já existe no andar")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_section(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateSectionPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let section = app_state.layout_service.update_section(&scope, id, &payload).await?;
    Ok(ApiResponse::ok("Section updated successfully", section))
}

#[utoipa::path(
    delete,
    path = "/api/sections/{id}",
    tag = "Layout",
    params(("id" = Uuid, Path, description = "ID da seção")),
    responses(
        (status = 200, description = "Seção removida"),
        (status = 400, description = "A seção ainda tem bancas"),
        (status = 404, description = "Seção não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_section(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.layout_service.delete_section(&scope, id).await?;
    Ok(ApiResponse::<()>::message("Section deleted successfully"))
}
