use console::Term;

/// Resolve when the server should stop.
///
/// The first Ctrl+C starts a graceful shutdown: in-flight requests finish,
/// new connections are refused. A second Ctrl+C exits immediately.
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }

    let is_tty = Term::stdout().is_term();
    if is_tty {
        eprintln!("\n\nShutdown requested, finishing in-flight requests...");
        eprintln!("Press Ctrl+C again to force quit.");
    }
    tracing::warn!("Shutdown requested, finishing in-flight requests");

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if is_tty {
                eprintln!("Force quit!");
            }
            std::process::exit(130);
        }
    });
}
