use clap::Parser;
use clinic_functions::config::Config;
use clinic_functions::server::{create_router, AppState};
use clinic_functions::FirebaseApp;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let key = config.load_service_account_key().await?;
    let project_id = config.project_id(&key)?;
    let settings = config.settings();
    let addr = config.listen_addr()?;

    tracing::info!(
        project_id = %project_id,
        %addr,
        bootstrap_enabled = settings.bootstrap_enabled(),
        "starting clinic-functions"
    );

    let state = AppState::new(FirebaseApp::new(key, project_id), settings);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
