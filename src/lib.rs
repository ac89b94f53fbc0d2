//! # splitd: web front-end for audio source separation
//!
//! `splitd` is a small HTTP service that accepts an uploaded audio file, runs
//! an external source-separation tool against it, and hands back download
//! links for the resulting stems (vocals and accompaniment). The separation
//! algorithm itself lives entirely in the external tool; this crate is the
//! plumbing around it.
//!
//! ## Request Flow
//!
//! A `POST /upload` with a multipart `audioFile` field moves through four
//! sequential stages:
//!
//! 1. The upload is streamed to `uploads/<job-id>`, chunk by chunk.
//! 2. The stored file is renamed to carry the original filename's extension
//!    so the tool can infer the container format.
//! 3. `output/<job-id>/` is created and the tool is invoked as a child
//!    process with a direct argument vector - no shell is involved anywhere,
//!    so filename content can never become command syntax.
//! 4. The two expected output files (`vocals/vocals.wav`,
//!    `accompaniment/accompaniment.wav`) are probed on disk and an HTML page
//!    linking the ones that exist is returned. A job that produced only one
//!    stem still succeeds; a job that produced neither fails.
//!
//! Each request is independent. There is deliberately no queueing, no
//! concurrency ceiling, and no timeout on the external process; simultaneous
//! uploads spawn simultaneous tool processes. Output directories are never
//! cleaned up.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use splitd::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = splitd::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     splitd::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module. Defaults reproduce the fixed behavior the
//! service started with: port 3000, `uploads/` and `output/` in the working
//! directory, and a `spleeter` two-stem invocation.

pub mod api;
pub mod config;
pub mod errors;
pub mod separator;
pub mod storage;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

pub use config::Config;
use separator::Separator;
use storage::Storage;
pub use types::JobId;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
    pub separator: Arc<dyn Separator>,
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: AppState) -> Router {
    // Allow some slack over the configured file limit for multipart framing;
    // the upload handler enforces the precise byte limit itself.
    let body_limit = state.config.storage.max_upload_bytes as usize + 64 * 1024;

    let router = Router::new()
        .route("/", get(api::handlers::uploads::index))
        .route(
            "/upload",
            post(api::handlers::uploads::separate).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/download/{job_id}/{stem}", get(api::handlers::downloads::download_stem))
        .route("/healthz", get(|| async { "OK" }))
        .with_state(state);

    // Add tracing layer
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct owning the router, storage layout, and config.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] validates the storage layout and wires
///    the configured separation backend
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        tracing::debug!("Starting splitd with configuration: {:#?}", config);

        let storage = Storage::new(&config.storage);
        storage.ensure_dirs().await?;

        let separator = separator::create_separator(&config.separator);

        let state = AppState {
            config: config.clone(),
            storage,
            separator,
        };

        Ok(Self {
            router: build_router(state),
            config,
        })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "splitd listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
