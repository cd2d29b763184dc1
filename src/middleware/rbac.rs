// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{Claims, Role},
};

/// 1. O Trait que define qual papel uma rota exige
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// 2. O Extractor (Guardião)
///
/// Decide apenas com as claims já validadas pelo `auth_guard`, por isso
/// roda antes de qualquer consulta: papel errado nunca chega ao banco.
pub struct RequireRole<R>(pub PhantomData<R>);

// 3. Implementação do FromRequestParts
impl<R, S> FromRequestParts<S> for RequireRole<R>
where
    R: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai as claims
        let claims = parts.extensions.get::<Claims>().ok_or(AppError::MissingToken)?;

        // B. Compara o papel
        let required = R::role();
        if claims.role != required {
            tracing::debug!(
                username = %claims.username,
                role = claims.role.as_str(),
                required = required.as_str(),
                "Papel insuficiente para a rota"
            );
            return Err(AppError::WrongRole(required.as_str()));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn role() -> Role { Role::Admin }
}

pub struct ManagerRole;
impl RoleDef for ManagerRole {
    fn role() -> Role { Role::BranchManager }
}

pub type RequireAdmin = RequireRole<AdminRole>;
pub type RequireManager = RequireRole<ManagerRole>;
