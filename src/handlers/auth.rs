// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{auth::AuthenticatedUser, rbac::RequireManager, tenancy::TenantScope},
    models::auth::{AuthResponse, BranchManagerInfo, LoginPayload, SessionUser, TokenStatus},
};

// Handler de login do admin
#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn admin_login(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let auth = app_state.auth_service.login_admin(&payload).await?;
    Ok(ApiResponse::ok("Login successful", auth))
}

// Handler de login do gerente de filial
#[utoipa::path(
    post,
    path = "/api/auth/branch_manager/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn branch_manager_login(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let auth = app_state.auth_service.login_branch_manager(&payload).await?;
    Ok(ApiResponse::ok("Login successful", auth))
}

// Dados do usuário a partir do token (sem consulta ao banco)
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = SessionUser),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(claims): AuthenticatedUser) -> impl IntoResponse {
    ApiResponse::ok("User retrieved", SessionUser::from(&claims))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify-token",
    tag = "Auth",
    responses(
        (status = 200, description = "Token válido", body = TokenStatus),
        (status = 401, description = "Token ausente, inválido ou expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_token(AuthenticatedUser(claims): AuthenticatedUser) -> impl IntoResponse {
    let status = TokenStatus {
        valid: true,
        expires_at: claims.expires_at(),
        user: SessionUser::from(&claims),
    };
    ApiResponse::ok("Token is valid", status)
}

// Tokens não têm estado no servidor: o logout só confirma ao cliente
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logout realizado"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(AuthenticatedUser(claims): AuthenticatedUser) -> impl IntoResponse {
    tracing::info!(username = %claims.username, role = claims.role.as_str(), "Logout");
    ApiResponse::<()>::message("Logged out successfully")
}

#[utoipa::path(
    get,
    path = "/api/auth/branch-manager-info",
    tag = "Auth",
    responses(
        (status = 200, description = "Perfil do gerente e da filial", body = BranchManagerInfo),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Somente gerentes de filial"),
        (status = 404, description = "Gerente sem filial ativa")
    ),
    security(("api_jwt" = []))
)]
pub async fn branch_manager_info(
    _guard: RequireManager,
    scope: TenantScope,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let manager_id = scope.manager_id().ok_or(AppError::InvalidToken)?;
    let info = app_state.auth_service.branch_manager_info(manager_id).await?;
    Ok(ApiResponse::ok("Branch manager info retrieved", info))
}
