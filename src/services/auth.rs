// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccountRepository,
    models::auth::{AuthResponse, BranchManagerInfo, Claims, LoginPayload, Role, SessionUser},
};

pub const BCRYPT_COST: u32 = 12;

/// Gera o hash fora do runtime async (bcrypt é propositalmente lento).
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

// Hash de uma senha que não pertence a conta alguma, gerado uma vez com o mesmo custo.
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

async fn dummy_hash() -> Result<&'static str, AppError> {
    let hashed = DUMMY_HASH
        .get_or_try_init(|| hash_password("no-such-account"))
        .await?;
    Ok(hashed.as_str())
}

/// Sempre paga o custo do bcrypt: sem conta, compara contra o hash fictício
/// e devolve `false`. Usuário inexistente e senha errada levam o mesmo tempo.
async fn password_matches(password: &str, stored_hash: Option<&str>) -> Result<bool, AppError> {
    match stored_hash {
        Some(stored_hash) => verify_password(password, stored_hash).await,
        None => {
            verify_password(password, dummy_hash().await?).await?;
            Ok(false)
        }
    }
}

// ---
// Token de sessão (HS256, sem estado no servidor)
// ---
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, sub: Uuid, username: &str, role: Role, branch_manager_id: Option<Uuid>) -> Result<String, AppError> {
        self.issue_at(sub, username, role, branch_manager_id, Utc::now())
    }

    /// Emite um token como se fosse `issued_at` (útil para testar expiração).
    pub fn issue_at(
        &self,
        sub: Uuid,
        username: &str,
        role: Role,
        branch_manager_id: Option<Uuid>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expires_at = issued_at + self.ttl;
        let claims = Claims {
            sub,
            username: username.to_owned(),
            role,
            branch_manager_id,
            iat: issued_at.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Assinatura e expiração; expirado vira `TokenExpired`, o resto `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

#[derive(Clone)]
pub struct AuthService {
    account_repo: AccountRepository,
    jwt: JwtKeys,
    pool: PgPool,
}

impl AuthService {
    pub fn new(account_repo: AccountRepository, jwt: JwtKeys, pool: PgPool) -> Self {
        Self { account_repo, jwt, pool }
    }

    pub async fn login_admin(&self, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
        let admin = self.account_repo.find_active_admin(&payload.username).await?;
        let valid = password_matches(&payload.password, admin.as_ref().map(|a| a.password_hash.as_str())).await?;

        let admin = match admin {
            Some(admin) if valid => admin,
            _ => {
                tracing::warn!(username = %payload.username, "Login de admin recusado");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.jwt.issue(admin.id, &admin.username, Role::Admin, None)?;
        tracing::info!(admin_id = %admin.id, "Admin autenticado");

        Ok(AuthResponse { token, user: SessionUser::from(admin) })
    }

    pub async fn login_branch_manager(&self, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
        let manager = self.account_repo.find_active_manager(&payload.username).await?;
        let valid = password_matches(&payload.password, manager.as_ref().map(|m| m.password_hash.as_str())).await?;

        let manager = match manager {
            Some(manager) if valid => manager,
            _ => {
                tracing::warn!(username = %payload.username, "Login de gerente recusado");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self
            .jwt
            .issue(manager.id, &manager.username, Role::BranchManager, Some(manager.id))?;
        tracing::info!(branch_manager_id = %manager.id, branch_id = %manager.branch_id, "Gerente autenticado");

        Ok(AuthResponse { token, user: SessionUser::from(manager) })
    }

    pub async fn branch_manager_info(&self, branch_manager_id: Uuid) -> Result<BranchManagerInfo, AppError> {
        self.account_repo
            .manager_info(branch_manager_id)
            .await?
            .ok_or(AppError::NotFound("Branch manager"))
    }

    /// Cria o admin inicial se ainda não existir. Devolve `true` quando criou.
    pub async fn bootstrap_admin(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if self.account_repo.admin_exists(username).await? {
            return Ok(false);
        }

        let password_hash = hash_password(password).await?;
        let id = self
            .account_repo
            .create_admin(&self.pool, username, &password_hash, None)
            .await?;

        tracing::info!(admin_id = %id, username, "Admin inicial criado");
        Ok(true)
    }
}
