//! Unknot server
//!
//! Serves the advice relay over HTTP.

use std::net::SocketAddr;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unknot::api::{cors_layer, create_router, AppState};
use unknot::composer::PromptTemplates;
use unknot::config::Config;
use unknot::llm::build_service;
use unknot::relay::Relay;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unknot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;

    let templates = match &config.prompts_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading prompt templates");
            PromptTemplates::load(path)?
        }
        None => PromptTemplates::default(),
    };

    let llm = build_service(&config.llm)?;
    tracing::info!(
        provider = %config.llm.provider,
        model = %config.llm.model(),
        max_tokens = config.max_tokens,
        "Completion provider configured"
    );

    let relay = Relay::new(llm, templates).with_max_tokens(config.max_tokens);
    let state = AppState::new(relay);

    let app = create_router(state)
        .layer(cors_layer(&config.frontend_url)?)
        .layer(CompressionLayer::new().gzip(true))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, frontend = %config.frontend_url, "Unknot server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT - shutting down"),
        () = terminate => tracing::info!("Received SIGTERM - shutting down"),
    }
}
