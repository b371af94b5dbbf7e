//! Affinidi Elements MCP server over Streamable HTTP (default port 3002)

use anyhow::Context as _;
use clap::Parser;
use elements_mcp::config::{init_tracing, load_dotenv, ServerArgs, ServerConfig};
use elements_mcp::server::{bind, report_fatal, serve, shutdown_signal};
use elements_mcp::build_elements_router;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        report_fatal(&e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let dotenv = load_dotenv().context("failed to load .env")?;
    let config = ServerArgs::parse()
        .resolve(ServerConfig::elements_defaults())
        .context("invalid configuration")?;
    init_tracing(&config.log_filter)?;
    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let listener = bind(&config).await?;
    let app = build_elements_router(&config).context("failed to build Affinidi API client")?;
    serve(listener, app, shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
