use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ideal_octo_garbanzo::config::Config;
use ideal_octo_garbanzo::github::OctocrabClient;
use ideal_octo_garbanzo::server::{AppState, build_router};
use ideal_octo_garbanzo::webhooks::{EventRouter, register_handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ideal_octo_garbanzo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    if config.webhook_secret.is_none() {
        tracing::warn!("GH_SECRET is not set; webhook signatures will not be verified");
    }
    if config.github_token.is_none() {
        tracing::warn!("GH_AUTH is not set; API calls will be unauthenticated");
    }

    let client = OctocrabClient::from_settings(config.client_settings())
        .context("failed to build GitHub client")?;

    let mut router = EventRouter::new();
    register_handlers(&mut router);
    tracing::info!(handlers = router.len(), "Registered webhook handlers");

    let app = build_router(AppState::new(router, config.secret_bytes(), client));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
