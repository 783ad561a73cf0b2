use anyhow::Context;
use sommelierr_server::config::{AppConfig, LogFormat};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    info!(
        radarr = %config.radarr.base_url,
        sonarr = %config.sonarr.base_url,
        poster_mode = %config.poster_policy,
        timeout_secs = config.upstream_timeout.as_secs(),
        "configuration loaded"
    );

    let app_state = sommelierr_server::state::AppState::from_config(&config)
        .context("failed to build upstream clients")?;
    let app = sommelierr_server::routes::build_router(app_state);

    let bind_addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
