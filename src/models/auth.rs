// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Papéis conhecidos pelo sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    BranchManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::BranchManager => "branch_manager",
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid, // ID da conta (admin ou gerente)
    pub username: String,
    pub role: Role,
    // Presente somente quando role = branch_manager
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_manager_id: Option<Uuid>,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp as i64, 0)
    }
}

// Dados para login (admin e gerente usam o mesmo formato)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

// Linha da tabela admins usada na autenticação
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminCredentials {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
}

// Gerente + filial atribuída (área/localização vêm da filial)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ManagerCredentials {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub area: String,
    pub location: String,
}

// O "user" devolvido no login e em /me
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub user_type: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_manager_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<AdminCredentials> for SessionUser {
    fn from(admin: AdminCredentials) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            user_type: Role::Admin,
            email: admin.email,
            first_name: None,
            last_name: None,
            full_name: None,
            branch_manager_id: None,
            branch_id: None,
            branch_name: None,
            area: None,
            location: None,
        }
    }
}

impl From<ManagerCredentials> for SessionUser {
    fn from(manager: ManagerCredentials) -> Self {
        let full_name = format!("{} {}", manager.first_name, manager.last_name);
        Self {
            id: manager.id,
            username: manager.username,
            user_type: Role::BranchManager,
            email: manager.email,
            first_name: Some(manager.first_name),
            last_name: Some(manager.last_name),
            full_name: Some(full_name),
            branch_manager_id: Some(manager.id),
            branch_id: Some(manager.branch_id),
            branch_name: Some(manager.branch_name),
            area: Some(manager.area),
            location: Some(manager.location),
        }
    }
}

impl From<&Claims> for SessionUser {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username.clone(),
            user_type: claims.role,
            email: None,
            first_name: None,
            last_name: None,
            full_name: None,
            branch_manager_id: claims.branch_manager_id,
            branch_id: None,
            branch_name: None,
            area: None,
            location: None,
        }
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: SessionUser,
}

// Resposta de /verify-token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    pub valid: bool,
    pub user: SessionUser,
    pub expires_at: Option<DateTime<Utc>>,
}

// Perfil completo do gerente (GET /api/auth/branch-manager-info)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BranchManagerInfo {
    pub branch_manager_id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub branch_id: Uuid,
    pub branch_name: String,
    pub area: String,
    pub location: String,
    pub address: Option<String>,
}
