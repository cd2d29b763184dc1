// src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use stall_backend::{
    build_router,
    config::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG sobrescreve o filtro padrão
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stall_backend=info,sqlx=warn")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let config = Config::from_env()?;
    let app_state = AppState::connect(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Primeiro admin, só quando ainda não existe nenhum
    if let Some((username, password)) = &config.admin_bootstrap {
        app_state.auth_service.bootstrap_admin(username, password).await?;
    }

    let app = build_router(app_state);

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
