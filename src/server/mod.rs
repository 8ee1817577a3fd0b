//! HTTP surface: `POST /screenshot` and `GET /health`.
//!
//! ```text
//! request ─▶ form::read_fields ─▶ FormFields::validate ─▶ convert ─▶ bytes
//!                 │                        │                  │
//!                 └──────── Html2ImageError (IntoResponse) ◀──┘
//! ```
//!
//! State is built once and shared immutably; every request gets its own temp
//! file and its own child process.

mod error;
mod form;
mod routes;

use crate::config::ServerConfig;
use crate::converter::ConverterFactory;
use crate::validate::RequestLimits;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared, read-only request context.
#[derive(Clone, Debug)]
pub struct AppState {
    pub factory: Arc<ConverterFactory>,
    pub default_engine: Arc<str>,
    pub limits: RequestLimits,
    pub max_upload_bytes: usize,
    pub cors: bool,
}

impl AppState {
    /// Build state with the stock converters for `config.engines`.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_factory(config, ConverterFactory::new(&config.engines))
    }

    /// Build state around a pre-populated factory.
    pub fn with_factory(config: &ServerConfig, factory: ConverterFactory) -> Self {
        Self {
            factory: Arc::new(factory),
            default_engine: Arc::from(config.default_engine.as_str()),
            limits: config.request_limits(),
            max_upload_bytes: config.max_upload_bytes,
            cors: config.cors,
        }
    }
}

/// The application router.
pub fn router(state: AppState) -> Router {
    let cors = state.cors;
    let app = Router::new()
        .route("/screenshot", post(routes::screenshot))
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}

/// Bind `config.bind_addr()` and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let state = AppState::new(&config);
    let app = router(state);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        default_engine = %config.default_engine,
        "html2image listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
