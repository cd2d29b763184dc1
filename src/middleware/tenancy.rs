// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, Role},
};

// Escopo de dados do chamador, derivado somente do token.
// Admin enxerga tudo; gerente enxerga a filial à qual está ativamente atribuído.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    Admin,
    Manager(Uuid),
}

impl TenantScope {
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        match (claims.role, claims.branch_manager_id) {
            (Role::Admin, _) => Ok(TenantScope::Admin),
            (Role::BranchManager, Some(id)) => Ok(TenantScope::Manager(id)),
            // Token de gerente sem o id do gerente não é aceito
            (Role::BranchManager, None) => Err(AppError::InvalidToken),
        }
    }

    pub fn manager_id(&self) -> Option<Uuid> {
        match self {
            TenantScope::Admin => None,
            TenantScope::Manager(id) => Some(*id),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, TenantScope::Admin)
    }

    /// Acrescenta o predicado de posse a uma consulta que já tem a filial
    /// no FROM/JOIN com o alias `branch_alias`.
    ///
    /// Para o gerente, a filial precisa ter um vínculo ATIVO com ele;
    /// um gerente desativado passa a ter escopo vazio.
    pub fn push_ownership(&self, qb: &mut QueryBuilder<'_, Postgres>, branch_alias: &str) {
        if let TenantScope::Manager(manager_id) = self {
            qb.push(" AND EXISTS (SELECT 1 FROM branch_managers bm WHERE bm.branch_id = ");
            qb.push(branch_alias);
            qb.push(".id AND bm.status = 'Active' AND bm.id = ");
            qb.push_bind(*manager_id);
            qb.push(")");
        }
    }
}

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts.extensions.get::<Claims>().ok_or(AppError::MissingToken)?;
        TenantScope::from_claims(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, manager: Option<Uuid>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            username: "u".into(),
            role,
            branch_manager_id: manager,
            iat: 0,
            exp: 1,
        }
    }

    #[test]
    fn admin_scope_adds_no_predicate() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM branches b WHERE TRUE");
        TenantScope::Admin.push_ownership(&mut qb, "b");
        assert_eq!(qb.sql(), "SELECT 1 FROM branches b WHERE TRUE");
    }

    #[test]
    fn manager_scope_requires_an_active_assignment() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM branches b WHERE TRUE");
        TenantScope::Manager(Uuid::new_v4()).push_ownership(&mut qb, "b");
        let sql = qb.sql();
        assert!(sql.contains("bm.branch_id = b.id"));
        assert!(sql.contains("bm.status = 'Active'"));
        assert!(sql.ends_with("bm.id = $1)"));
    }

    #[test]
    fn scope_comes_from_the_token() {
        let id = Uuid::new_v4();
        assert_eq!(
            TenantScope::from_claims(&claims(Role::BranchManager, Some(id))).unwrap(),
            TenantScope::Manager(id)
        );
        assert!(TenantScope::from_claims(&claims(Role::Admin, None)).unwrap().is_admin());
        assert!(TenantScope::from_claims(&claims(Role::BranchManager, None)).is_err());
    }
}
