//! FlowGuard Web Server
//!
//! Dataset upload/preview and single-flow anomaly detection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      FLOWGUARD WEB                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  Routes   │  │  Session  │  │  Classifier             │ │
//! │  │  (Axum)   │  │  (signed  │  │  (ONNX Runtime)         │ │
//! │  │           │  │  cookie)  │  │                         │ │
//! │  └─────┬─────┘  └───────────┘  └─────────────────────────┘ │
//! │        ▼                                                    │
//! │  ┌─────────────┐                                            │
//! │  │ uploads/    │                                            │
//! │  └─────────────┘                                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod storage;
mod models;
mod handlers;
mod middleware;
mod error;
mod upload;
mod preview;
mod classifier;
mod views;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower_http::{
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use classifier::{Classifier, OnnxClassifier};
use storage::DatasetStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "flowguard_web=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("FlowGuard Web starting...");

    let store = DatasetStore::open(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.upload_dir.display()))?;

    // The service is useless without a model, so a load failure is fatal
    let model = OnnxClassifier::load(&config.model_path)
        .with_context(|| format!("Failed to load model {}", config.model_path.display()))?;

    let state = AppState {
        key: middleware::session::signing_key(config.session_secret.as_deref()),
        store,
        classifier: Arc::new(model),
        config: Arc::new(config),
    };

    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port)
        .parse()
        .context("Invalid HOST/PORT")?;

    let app = create_router(state);

    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub store: DatasetStore,
    pub classifier: Arc<dyn Classifier>,
    pub key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes();

    let pages = Router::new()
        .route("/", get(handlers::pages::index))
        .route("/about", get(handlers::pages::about))
        .route("/tentang", get(handlers::pages::about))
        .route("/health", get(handlers::health::check));

    let datasets = Router::new()
        .route("/dataset", get(handlers::dataset::show).post(handlers::dataset::upload))
        .route("/download", get(handlers::files::download))
        .route("/delete/:filename", post(handlers::files::delete))
        .route("/uploads/:filename", get(handlers::files::raw))
        .route("/delete_all", post(handlers::files::delete_all));

    let detection = Router::new()
        .route("/detect", get(handlers::detect::form).post(handlers::detect::submit))
        .route("/deteksi", get(handlers::detect::form).post(handlers::detect::submit));

    Router::new()
        .merge(pages)
        .merge(datasets)
        .merge(detection)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
