// src/handlers/branches.rs
// Filiais: todas as rotas exigem o papel admin.

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
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin},
    models::branch::{
        AssignManagerPayload, Branch, BranchManager, BranchOverview, CreateBranchPayload, UpdateBranchPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Branches",
    responses(
        (status = 200, description = "Filiais com o gerente ativo", body = Vec<BranchOverview>),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Somente admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_branches(
    _guard: RequireAdmin,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let branches = app_state.branch_service.list().await?;
    Ok(ApiResponse::list("Branches retrieved successfully", branches))
}

#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "Branches",
    request_body = CreateBranchPayload,
    responses(
        (status = 201, description = "Filial criada", body = Branch),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Somente admin"),
        (status = 409, description = "Nome ou área/localização já usados")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_branch(
    _guard: RequireAdmin,
    AuthenticatedUser(claims): AuthenticatedUser,
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateBranchPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let branch = app_state.branch_service.create(claims.sub, &payload).await?;
    Ok(ApiResponse::created("Branch created successfully", branch))
}

#[utoipa::path(
    get,
    path = "/api/branches/{id}",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "ID da filial")),
    responses(
        (status = 200, description = "Filial", body = BranchOverview),
        (status = 404, description = "Filial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_branch(
    _guard: RequireAdmin,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let branch = app_state.branch_service.get(id).await?;
    Ok(ApiResponse::ok("Branch retrieved successfully", branch))
}

#[utoipa::path(
    put,
    path = "/api/branches/{id}",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "ID da filial")),
    request_body = UpdateBranchPayload,
    responses(
        (status = 200, description = "Filial atualizada", body = Branch),
        (status = 400, description = "Nada para atualizar"),
        (status = 404, description = "Filial não encontrada"),
        (status = 409, description = "Nome ou área/localização já usados")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_branch(
    _guard: RequireAdmin,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateBranchPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let branch = app_state.branch_service.update(id, &payload).await?;
    Ok(ApiResponse::ok("Branch updated successfully", branch))
}

#[utoipa::path(
    delete,
    path = "/api/branches/{id}",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "ID da filial")),
    responses(
        (status = 200, description = "Filial removida"),
        (status = 400, description = "A filial ainda tem bancas"),
        (status = 404, description = "Filial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_branch(
    _guard: RequireAdmin,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    app_state.branch_service.delete(id).await?;
    Ok(ApiResponse::<()>::message("Branch deleted successfully"))
}

#[utoipa::path(
    put,
    path = "/api/branches/{id}/assign-manager",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "ID da filial")),
    request_body = AssignManagerPayload,
    responses(
        (status = 200, description = "Gerente atribuído", body = BranchManager),
        (status = 400, description = "A filial já tem um gerente ativo"),
        (status = 404, description = "Filial não encontrada"),
        (status = 409, description = "Username já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_manager(
    _guard: RequireAdmin,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<AssignManagerPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let manager = app_state.branch_service.assign_manager(id, &payload).await?;
    Ok(ApiResponse::ok("Branch manager assigned successfully", manager))
}

#[utoipa::path(
    delete,
    path = "/api/branches/{id}/manager",
    tag = "Branches",
    params(("id" = Uuid, Path, description = "ID da filial")),
    responses(
        (status = 200, description = "Gerente desativado", body = BranchManager),
        (status = 404, description = "Filial ou gerente ativo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_manager(
    _guard: RequireAdmin,
    State(app_state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let manager = app_state.branch_service.deactivate_manager(id).await?;
    Ok(ApiResponse::ok("Branch manager deactivated successfully", manager))
}
