//! # `crs serve` — Run the HTTP API
//!
//! Assembles the in-process stack (mock provider, record store,
//! verification coordinator) and serves the record lifecycle API.

use clap::Args;

use crs_api::app;
use crs_compute::MockConfidentialCompute;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind, e.g. 127.0.0.1:8080.
    #[arg(long, default_value = "127.0.0.1:8080", env = "CRS_BIND")]
    pub bind: String,
}

/// Run the API server until interrupted.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let api = crate::assemble(MockConfidentialCompute::new());
    let router = app(crate::app_state(api));

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(bind = %args.bind, "record lifecycle API listening");
    axum::serve(listener, router).await?;
    Ok(())
}
