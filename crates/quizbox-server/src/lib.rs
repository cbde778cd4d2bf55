//! quizbox-server: HTTP front end for the result store
//!
//! Routes:
//! - `POST /save-results`: append the JSON object body to the store
//! - `GET /respostas.json`: the whole stored collection
//! - `GET /healthz`: liveness probe
//! - anything else: static files from the configured asset root
//!
//! Every response carries permissive CORS headers.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};
use quizbox_store::ResultStore;

pub mod assets;
pub mod cors;
pub mod routes;

/// Request body limit applied when none is configured (100 KiB).
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ResultStore>,
    pub static_root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<ResultStore>, static_root: &Path) -> Self {
        Self {
            store,
            static_root: Arc::new(static_root.to_path_buf()),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/save-results", post(routes::save_results))
        .route("/respostas.json", get(routes::get_results))
        .route("/healthz", get(routes::healthz))
        .fallback(assets::serve_asset)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(cors::cors))
        .with_state(state)
}

/// Create the data directory ahead of the first request.
///
/// A failure is logged and otherwise ignored: every append retries the
/// directory creation and reports its own error.
pub fn prepare_storage(store: &ResultStore) {
    if let Err(e) = store.ensure_storage_ready() {
        log::error!("storage not ready at startup: {e}");
    }
}

/// Serve `app` on `listener` until Ctrl-C or SIGTERM.
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> io::Result<()> {
    let addr = listener.local_addr()?;
    log::info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(quizbox_core::shutdown_signal())
        .await?;

    log::info!("server on {addr} stopped");
    Ok(())
}
