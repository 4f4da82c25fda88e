//! airglobe-server: serves normalized air-quality points fetched from OpenAQ.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use airglobe_server::{AppState, Args, build_router, build_service};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_err| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Starting airglobe-server v{}", env!("CARGO_PKG_VERSION"));

    // Misconfiguration is the only fatal case; refuse to serve at all.
    let service = match build_service(&args) {
        Ok(service) => service,
        Err(err) => {
            error!("Failed to configure pipeline: {err}");
            return Err(err.into());
        }
    };

    let config = *service.config();
    info!(
        pages = config.page_count,
        page_size = config.page_size,
        page_timeout = ?config.page_timeout,
        request_timeout = ?config.request_timeout,
        "pipeline configured"
    );

    let app = build_router(AppState::new(service));

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("airglobe-server listening on http://{addr}");
    info!("Points: http://{addr}/api/air-quality");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("could not listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("got SIGINT, draining connections");
}
