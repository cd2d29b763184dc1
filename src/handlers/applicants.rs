// src/handlers/applicants.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{rbac::RequireAdmin, tenancy::TenantScope},
    models::applicant::{ApplicantDetail, ApplicantSummary, CreateApplicantPayload, UpdateApplicantPayload},
};

// Cadastro público (formulário da landing page)
#[utoipa::path(
    post,
    path = "/api/applicants",
    tag = "Applicants",
    request_body = CreateApplicantPayload,
    responses(
        (status = 201, description = "Candidato registrado", body = ApplicantDetail),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_applicant(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateApplicantPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let applicant = app_state.applicant_service.create(&payload).await?;
    Ok(ApiResponse::created("Applicant created successfully", applicant))
}

#[utoipa::path(
    get,
    path = "/api/applicants",
    tag = "Applicants",
    responses(
        (status = 200, description = "Candidatos visíveis ao chamador", body = Vec<ApplicantSummary>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_applicants(
    scope: TenantScope,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let applicants = app_state.applicant_service.list(&scope).await?;
    Ok(ApiResponse::list("Applicants retrieved successfully", applicants))
}

#[utoipa::path(
    get,
    path = "/api/applicants/{id}",
    tag = "Applicants",
    params(("id" = Uuid, Path, description = "ID do candidato")),
    responses(
        (status = 200, description = "Candidato com registros laterais", body = ApplicantDetail),
        (status = 404, description = "Candidato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_applicant(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let applicant = app_state.applicant_service.get(&scope, id).await?;
    Ok(ApiResponse::ok("Applicant retrieved successfully", applicant))
}

#[utoipa::path(
    put,
    path = "/api/applicants/{id}",
    tag = "Applicants",
    params(("id" = Uuid, Path, description = "ID do candidato")),
    request_body = UpdateApplicantPayload,
    responses(
        (status = 200, description = "Candidato atualizado", body = ApplicantDetail),
        (status = 400, description = "Dados inválidos ou nada para atualizar"),
        (status = 404, description = "Candidato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_applicant(
    scope: TenantScope,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateApplicantPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let applicant = app_state.applicant_service.update(&scope, id, &payload).await?;
    Ok(ApiResponse::ok("Applicant updated successfully", applicant))
}

#[utoipa::path(
    delete,
    path = "/api/applicants/{id}",
    tag = "Applicants",
    params(("id" = Uuid, Path, description = "ID do candidato")),
    responses(
        (status = 200, description = "Candidato removido"),
        (status = 403, description = "Somente admin"),
        (status = 404, description = "Candidato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_applicant(
    _guard: RequireAdmin,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.applicant_service.delete(id).await?;
    Ok(ApiResponse::<()>::message("Applicant deleted successfully"))
}
