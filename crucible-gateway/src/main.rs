//! Entry point for the `crucible-gateway` HTTP server.

use std::sync::Arc;

use crucible_engine::ScriptEngine;
use crucible_gateway::{routes::create_router, settings};
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = match settings::load() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    // One-time capability probe; the verdict holds for the process lifetime.
    let engine = ScriptEngine::new(Arc::new(settings.sandbox)).await;
    info!(backend = %engine.capability(), "script engine ready");

    let app = create_router(Arc::new(engine));

    let listener = match tokio::net::TcpListener::bind(&settings.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %settings.listen_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %settings.listen_addr, "crucible-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
