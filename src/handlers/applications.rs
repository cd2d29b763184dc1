// src/handlers/applications.rs

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
    middleware::tenancy::TenantScope,
    models::application::{
        Application, ApplicationDetail, ApplicationFilter, ApplicationListItem, ApplicationStats,
        CreateApplicationPayload, StatusChange, UpdateApplicationStatusPayload,
    },
};

// Submissão pública de candidatura a uma banca
#[utoipa::path(
    post,
    path = "/api/applications",
    tag = "Applications",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Candidatura registrada", body = Application),
        (status = 400, description = "Banca indisponível ou dados inválidos"),
        (status = 404, description = "Banca ou candidato não encontrado"),
        (status = 409, description = "Candidatura ativa já existe para esta banca")
    )
)]
pub async fn create_application(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateApplicationPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let application = app_state.application_service.create(&payload).await?;
    Ok(ApiResponse::created("Application submitted successfully", application))
}

#[utoipa::path(
    get,
    path = "/api/applications",
    tag = "Applications",
    params(ApplicationFilter),
    responses(
        (status = 200, description = "Candidaturas visíveis ao chamador", body = Vec<ApplicationListItem>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_applications(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<ApplicationFilter>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let applications = app_state.application_service.list(&scope, &filter).await?;
    Ok(ApiResponse::list("Applications retrieved successfully", applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/stats",
    tag = "Applications",
    responses((status = 200, description = "Contagem por status e candidaturas recentes", body = ApplicationStats)),
    security(("api_jwt" = []))
)]
pub async fn application_stats(
    scope: TenantScope,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.application_service.stats(&scope).await?;
    Ok(ApiResponse::ok("Application statistics retrieved successfully", stats))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    tag = "Applications",
    params(("id" = Uuid, Path, description = "ID da candidatura")),
    responses(
        (status = 200, description = "Candidatura com dados do candidato", body = ApplicationDetail),
        (status = 404, description = "Candidatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_application(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let application = app_state.application_service.get(&scope, id).await?;
    Ok(ApiResponse::ok("Application retrieved successfully", application))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/status",
    tag = "Applications",
    params(("id" = Uuid, Path, description = "ID da candidatura")),
    request_body = UpdateApplicationStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = StatusChange),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Candidatura não encontrada"),
        (status = 409, description = "A banca já tem uma candidatura aprovada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_application_status(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateApplicationStatusPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let change = app_state
        .application_service
        .update_status(&scope, id, &payload.status)
        .await?;
    Ok(ApiResponse::ok("Application status updated successfully", change))
}

#[utoipa::path(
    delete,
    path = "/api/applications/{id}",
    tag = "Applications",
    params(("id" = Uuid, Path, description = "ID da candidatura")),
    responses(
        (status = 200, description = "Candidatura removida"),
        (status = 404, description = "Candidatura não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_application(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.application_service.delete(&scope, id).await?;
    Ok(ApiResponse::<()>::message("Application deleted successfully"))
}
