// src/config.rs

use chrono::Duration as TokenDuration;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::{env, str::FromStr, time::Duration};

use crate::{
    db::{
        AccountRepository, ApplicantRepository, ApplicationRepository, BranchRepository, FloorRepository,
        LandingRepository, SectionRepository, StallRepository,
    },
    services::{
        applicant_service::ApplicantService,
        application_service::ApplicationService,
        auth::{AuthService, JwtKeys},
        branch_service::BranchService,
        landing_service::LandingService,
        layout_service::LayoutService,
        stall_service::StallService,
    },
};

pub const DEV_JWT_SECRET: &str = "dev-only-insecure-jwt-secret-change-me";

// ---
// Configuração do banco
// ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    // Se presente, substitui os campos individuais
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        let options = match &self.url {
            Some(url) => PgConnectOptions::from_str(url)?,
            None => PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .username(&self.user)
                .password(&self.password)
                .database(&self.name),
        };
        Ok(options)
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(3))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub host: String,
    pub port: u16,
    pub admin_bootstrap: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lê a configuração de qualquer fonte chave -> valor.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_owned());

        let database = DatabaseConfig {
            host: get("DB_HOST", "localhost"),
            port: parse_var("DB_PORT", &get("DB_PORT", "5432"))?,
            user: get("DB_USER", "postgres"),
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            name: get("DB_NAME", "naga_stall"),
            url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            max_connections: parse_var("DB_MAX_CONNECTIONS", &get("DB_MAX_CONNECTIONS", "5"))?,
        };

        let jwt_secret = match lookup("JWT_SECRET").filter(|v| !v.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET não definido; usando o segredo de desenvolvimento");
                DEV_JWT_SECRET.to_owned()
            }
        };

        let token_ttl_hours: i64 = parse_var("TOKEN_TTL_HOURS", &get("TOKEN_TTL_HOURS", "24"))?;
        if token_ttl_hours <= 0 {
            anyhow::bail!("TOKEN_TTL_HOURS deve ser positivo");
        }

        let admin_bootstrap = match (
            lookup("ADMIN_BOOTSTRAP_USERNAME").filter(|v| !v.is_empty()),
            lookup("ADMIN_BOOTSTRAP_PASSWORD").filter(|v| !v.is_empty()),
        ) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        };

        Ok(Self {
            database,
            jwt_secret,
            token_ttl_hours,
            host: get("HOST", "0.0.0.0"),
            port: parse_var("PORT", &get("PORT", "3001"))?,
            admin_bootstrap,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn jwt_keys(&self) -> JwtKeys {
        JwtKeys::new(&self.jwt_secret, TokenDuration::hours(self.token_ttl_hours))
    }
}

fn parse_var<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Valor inválido para {key} ({raw}): {e}"))
}

// ---
// Estado compartilhado da aplicação
// ---
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt: JwtKeys,
    pub auth_service: AuthService,
    pub branch_service: BranchService,
    pub layout_service: LayoutService,
    pub stall_service: StallService,
    pub landing_service: LandingService,
    pub applicant_service: ApplicantService,
    pub application_service: ApplicationService,
}

impl AppState {
    /// Conecta ao banco e monta o estado.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let db_pool = config
            .database
            .pool_options()
            .connect_with(config.database.connect_options()?)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(Self::new(db_pool, config.jwt_keys()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn new(db_pool: PgPool, jwt: JwtKeys) -> Self {
        let account_repo = AccountRepository::new(db_pool.clone());
        let branch_repo = BranchRepository::new(db_pool.clone());
        let floor_repo = FloorRepository::new(db_pool.clone());
        let section_repo = SectionRepository::new(db_pool.clone());
        let stall_repo = StallRepository::new(db_pool.clone());
        let landing_repo = LandingRepository::new(db_pool.clone());
        let applicant_repo = ApplicantRepository::new(db_pool.clone());
        let application_repo = ApplicationRepository::new(db_pool.clone());

        Self {
            auth_service: AuthService::new(account_repo, jwt.clone(), db_pool.clone()),
            branch_service: BranchService::new(branch_repo.clone(), db_pool.clone()),
            layout_service: LayoutService::new(
                branch_repo.clone(),
                floor_repo,
                section_repo.clone(),
                db_pool.clone(),
            ),
            stall_service: StallService::new(branch_repo, section_repo, stall_repo.clone(), db_pool.clone()),
            landing_service: LandingService::new(landing_repo),
            applicant_service: ApplicantService::new(
                applicant_repo.clone(),
                application_repo.clone(),
                stall_repo.clone(),
                db_pool.clone(),
            ),
            application_service: ApplicationService::new(applicant_repo, application_repo, stall_repo, db_pool.clone()),
            jwt,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "naga_stall");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.port, 3001);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert!(config.admin_bootstrap.is_none());
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "6543"),
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("ADMIN_BOOTSTRAP_USERNAME", "root"),
            ("ADMIN_BOOTSTRAP_PASSWORD", "changeme"),
        ])
        .unwrap();
        assert_eq!(config.database.host, "db");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.port, 8080);
        assert_eq!(config.admin_bootstrap, Some(("root".into(), "changeme".into())));
    }

    #[test]
    fn database_url_takes_precedence() {
        let config = config_from(&[("DATABASE_URL", "postgres://u:p@remote:5433/other")]).unwrap();
        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "remote");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("other"));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(config_from(&[("PORT", "abc")]).is_err());
        assert!(config_from(&[("TOKEN_TTL_HOURS", "0")]).is_err());
    }
}
