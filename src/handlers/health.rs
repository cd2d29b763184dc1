// src/handlers/health.rs

use axum::{extract::State, response::IntoResponse};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
};

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço e banco respondendo"),
        (status = 500, description = "Banco indisponível")
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    sqlx::query("SELECT 1").execute(&app_state.db_pool).await?;
    Ok(ApiResponse::<()>::message("OK"))
}
