//! `verisnap serve`: run the HTTP runtime

use std::net::SocketAddr;
use verisnap_http::{AnalysisRuntime, RuntimeConfigBuilder, shutdown_signal};

use crate::error::{CliError, CliResult};

pub async fn run_serve(addr: SocketAddr) -> CliResult<()> {
    let config = RuntimeConfigBuilder::from_env()?.build()?;
    let runtime = AnalysisRuntime::from_config(config)?;
    let app = runtime.router();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(CliError::Server)?;
    tracing::info!(%addr, "verisnap server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(CliError::Server)?;

    tracing::info!("verisnap server stopped");
    Ok(())
}
