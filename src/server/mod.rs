//! Web server exposing OCR inference over HTTP.
//!
//! One POST endpoint accepts an image upload, delegates to the configured
//! inference engine, and returns extracted text plus classified label
//! fields. There is no queueing or admission control here: each request
//! holds a blocking task for the duration of the child process, bounded
//! by the per-request timeout.

mod handlers;
mod routes;

pub use routes::create_router;

use std::sync::Arc;

use crate::config::Settings;
use crate::engine::{self, OcrEngine};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Resolved inference engine; `None` means every /ocr request is a 503.
    pub engine: Option<Arc<dyn OcrEngine>>,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: Arc::new(settings.clone()),
            engine: engine::resolve(settings).map(Arc::from),
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&settings.upload_dir).await?;

    let state = AppState::new(settings);
    match &state.engine {
        Some(engine) => {
            tracing::info!(backend = engine.kind().as_str(), "inference backend selected")
        }
        None => tracing::warn!("no inference backend configured; /ocr will return 503"),
    }

    let app = create_router(state);

    tracing::info!("Starting server at http://{}", bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
