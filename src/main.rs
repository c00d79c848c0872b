use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;

use trip_prompt_service::config::Settings;
use trip_prompt_service::server::{create_app, AppState};
use trip_prompt_service::tasks::TemplateReloadTask;
use trip_prompt_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    // Create application state, loading templates from the configured sources
    let state = AppState::new(settings.clone());
    tracing::info!(
        templates = state.template_engine.count(),
        categories = ?state.template_engine.list_available(),
        "Template engine initialized"
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    // Start periodic template reload in background
    let reload_handle = if settings.templates.reload_interval_seconds > 0 {
        let task = TemplateReloadTask::new(
            Duration::from_secs(settings.templates.reload_interval_seconds),
            state.template_engine.clone(),
            shutdown_tx.subscribe(),
        );
        Some(tokio::spawn(task.run()))
    } else {
        tracing::info!("Periodic template reload disabled");
        None
    };

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_tx))
        .await?;

    if let Some(handle) = reload_handle {
        tracing::info!("Waiting for background tasks to finish...");
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Stop background tasks
    let _ = shutdown_tx.send(());
}
