use std::net::SocketAddr;

use anyhow::Context;
use backup_triage::classify::Vocabulary;
use backup_triage::config::AppConfig;
use backup_triage::server::{AppState, GlpiConnector, build_router};
use backup_triage::units::SiteTable;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backup_triage=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let table = SiteTable::load(&config.units_file).context("loading units table")?;
    let vocabulary = Vocabulary::standard().context("compiling log vocabulary")?;
    tracing::info!(
        units = table.len(),
        log_root = %config.log_root.display(),
        staging = %config.staging_dir.display(),
        "Configuration loaded"
    );

    let state = AppState::new(
        GlpiConnector::new(config.glpi.clone()),
        &config,
        vocabulary,
        table,
    );
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
