use anyhow::{Context, Result};
use argus_runtime::{Config, InboxEvent, Scheduler};
use argus_server::{create_app, AppState};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

/// `argus serve` — load config, start the scheduler and ingress surface, run
/// until `SIGINT`/`SIGTERM`.
pub fn handle(config_path: Option<&str>, port_override: Option<u16>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;
    runtime.block_on(serve(config_path, port_override))
}

async fn serve(config_path: Option<&str>, port_override: Option<u16>) -> Result<()> {
    let mut config = Config::load(config_path).context("failed to load configuration")?;
    if let Some(port) = port_override {
        config.listen_port = port;
    }

    let (tx, rx) = mpsc::channel::<InboxEvent>(256);
    let (scheduler, publisher) = Scheduler::new(config.clone(), rx);
    let scheduler_handle = tokio::spawn(scheduler.run());

    let state = AppState::new(tx, publisher);
    let app = create_app(state);

    let addr = format!("127.0.0.1:{}", config.listen_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("port {} is already in use", config.listen_port))?;
    info!(%addr, "argus listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    drop(scheduler_handle);
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        sigterm.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
