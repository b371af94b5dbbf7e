//! HTTP serving and process lifecycle
//!
//! Runs the `/mcp` router until the shutdown future resolves, then closes
//! every live session before the accept loop stops.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use crate::builder::McpApp;
use crate::config::ServerConfig;
use crate::mcp::ShutdownReport;

/// How long open streams get to finish after all sessions are closed
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn bind(config: &ServerConfig) -> io::Result<TcpListener> {
    let addr = config.bind_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|e| io::Error::new(e.kind(), format!("failed to bind {addr}: {e}")))
}

/// Serve `app` on `listener` until `shutdown` resolves.
///
/// On shutdown every registered session is closed (failures are logged and
/// skipped), then the server stops accepting connections.
pub async fn serve<F>(listener: TcpListener, app: McpApp, shutdown: F) -> io::Result<ShutdownReport>
where
    F: Future<Output = ()> + Send,
{
    let McpApp { router, registry } = app;
    let addr = listener.local_addr()?;
    let router = router.layer(TraceLayer::new_for_http());

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });
    let abort = server.abort_handle();

    tracing::info!(%addr, "MCP Streamable HTTP Server listening");
    shutdown.await;
    tracing::info!(sessions = registry.len(), "Shutting down server...");

    let report = registry.close_all().await;
    let _ = stop_tx.send(());

    match tokio::time::timeout(DRAIN_TIMEOUT, server).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => return Err(io::Error::other(e)),
        Err(_) => {
            tracing::warn!("connections still open after drain timeout, aborting");
            abort.abort();
        }
    }

    tracing::info!(
        closed = report.closed.len(),
        failed = report.failed.len(),
        "Server shutdown complete"
    );
    Ok(report)
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Report an error that ends the process, through tracing when it is up
pub fn report_fatal(err: &anyhow::Error) {
    if tracing::dispatcher::has_been_set() {
        tracing::error!(error = %format_args!("{err:#}"), "Failed to run server");
    } else {
        eprintln!("Failed to run server: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_notes_router;

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let mut config = ServerConfig::notes_defaults();
        config.port = 0;
        let listener = bind(&config).await.unwrap();
        let app = build_notes_router(&config);

        let report = serve(listener, app, async {}).await.unwrap();
        assert!(report.closed.is_empty());
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_error() {
        let mut config = ServerConfig::notes_defaults();
        config.port = 0;
        let first = bind(&config).await.unwrap();
        config.port = first.local_addr().unwrap().port();
        assert!(bind(&config).await.is_err());
    }
}
