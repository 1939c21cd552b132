//! `colloquy` binary entrypoint.
//!
//! Loads configuration from the environment, wires the file-backed store and
//! the HTTP generation engine into the conversation API, and serves it until
//! Ctrl+C or SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use colloquy::adapters::ai::{HttpGeneratorConfig, HttpTextGenerator};
use colloquy::adapters::http::{build_app, ConversationAppState};
use colloquy::adapters::storage::FileConversationStore;
use colloquy::config::{AppConfig, ServerConfig};
use colloquy::ports::{AIProvider, ConversationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server);
    config.validate().context("invalid configuration")?;

    let store: Arc<dyn ConversationStore> = Arc::new(
        FileConversationStore::open(&config.storage.data_dir)
            .await
            .context("failed to open conversation store")?,
    );

    let generation = &config.generation;
    let provider: Arc<dyn AIProvider> = Arc::new(
        HttpTextGenerator::new(
            HttpGeneratorConfig::new(&generation.base_url)
                .with_model(&generation.model)
                .with_api_key_secret(generation.api_key.clone())
                .with_timeout(generation.timeout())
                .with_max_context_tokens(generation.model_context_tokens),
        )
        .context("failed to build generation client")?,
    );

    let state = ConversationAppState::new(
        store,
        provider,
        config.turn_settings(),
        generation.default_options(),
    );

    let app = build_app(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        %addr,
        data_dir = %config.storage.data_dir.display(),
        model = %generation.model,
        "Colloquy listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` wins over the configured filter. Logs are JSON outside development.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if server.json_logs() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
