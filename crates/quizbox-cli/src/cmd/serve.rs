//! `quizbox serve` - run the HTTP server

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use quizbox_server::AppState;
use quizbox_store::ResultStore;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (default from config: 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory holding the results file
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Directory served as static frontend assets
    #[arg(long)]
    pub static_root: Option<PathBuf>,

    /// Maximum request body size in bytes
    #[arg(long)]
    pub body_limit: Option<usize>,
}

pub fn run(args: ServeArgs, config: &Config) -> Result<()> {
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let data_dir = args
        .data_dir
        .unwrap_or_else(|| config.storage.data_dir.clone());
    let static_root = args
        .static_root
        .unwrap_or_else(|| config.assets.root.clone());
    let body_limit = args.body_limit.unwrap_or(config.server.body_limit);

    let store = Arc::new(ResultStore::with_file_name(
        &data_dir,
        &config.storage.file_name,
    ));
    log::info!(
        "results file: {}, static root: {}",
        store.path().display(),
        static_root.display()
    );
    quizbox_server::prepare_storage(&store);

    let app = quizbox_server::router(AppState::new(store, &static_root), body_limit);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(async {
        let listener = bind(&host, port).await?;
        quizbox_server::serve(listener, app)
            .await
            .context("server error")
    })
}

/// Bind `host:port`; `host` may be a hostname or a bare IPv4/IPv6 address.
async fn bind(host: &str, port: u16) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host} port {port}"))
}
