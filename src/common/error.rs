// src/common/error.rs

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

// Um único tipo de erro para toda a API.
// Cada variante corresponde a exatamente um status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    // --- 400 ---
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Malformed request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Malformed query string: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Malformed path parameter: {0}")]
    InvalidPath(#[from] PathRejection),

    // --- 401 ---
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    // --- 403 ---
    #[error("This action requires the '{0}' role")]
    WrongRole(&'static str),

    // --- 404 ---
    // Também usado quando o recurso existe mas está fora do escopo do chamador.
    #[error("{0} not found")]
    NotFound(&'static str),

    // --- 409 ---
    #[error("{0}")]
    Conflict(String),

    // --- 500 ---
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::InvalidBody(_)
            | AppError::InvalidQuery(_)
            | AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::TokenExpired => StatusCode::UNAUTHORIZED,

            AppError::WrongRole(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,

            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte uma violação de unicidade do banco em `Conflict`;
    /// qualquer outro erro segue como `DatabaseError`.
    pub fn from_unique_violation(err: sqlx::Error, message: impl Into<String>) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Conflict(message.into());
            }
        }
        AppError::DatabaseError(err)
    }

    fn validation_details(errors: &validator::ValidationErrors) -> Value {
        let mut details = serde_json::Map::new();
        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            details.insert(field.to_string(), json!(messages));
        }
        Value::Object(details)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AppError::ValidationError(errors) => json!({
                "success": false,
                "message": "One or more fields are invalid.",
                "details": Self::validation_details(errors),
            }),

            AppError::InvalidBody(rejection) => json!({
                "success": false,
                "message": "Malformed request body.",
                "error": rejection.body_text(),
            }),
            AppError::InvalidQuery(rejection) => json!({
                "success": false,
                "message": "Malformed query string.",
                "error": rejection.body_text(),
            }),
            AppError::InvalidPath(rejection) => json!({
                "success": false,
                "message": "Malformed path parameter.",
                "error": rejection.body_text(),
            }),

            // Todos os 500 são logados e respondidos com mensagem genérica.
            // O detalhe só vai para o cliente em builds de debug.
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Internal server error: {}", e);
                if cfg!(debug_assertions) {
                    json!({
                        "success": false,
                        "message": "An unexpected error occurred.",
                        "error": e.to_string(),
                    })
                } else {
                    json!({
                        "success": false,
                        "message": "An unexpected error occurred.",
                    })
                }
            }

            e => json!({
                "success": false,
                "message": e.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_client_errors() {
        assert_eq!(AppError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::WrongRole("admin").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Stall").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_failures_are_server_errors() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_unique_errors_are_not_turned_into_conflicts() {
        let err = AppError::from_unique_violation(sqlx::Error::PoolTimedOut, "dup");
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(AppError::NotFound("Stall").to_string(), "Stall not found");
    }
}
