use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinError;

use crate::template::{ReloadReport, TemplateEngine};

/// Run a registry reload on the blocking thread pool
pub async fn reload_in_background(engine: Arc<TemplateEngine>) -> Result<ReloadReport, JoinError> {
    tokio::task::spawn_blocking(move || engine.reload()).await
}

/// Background task that periodically reloads the template registry
pub struct TemplateReloadTask {
    interval: Duration,
    engine: Arc<TemplateEngine>,
    shutdown: broadcast::Receiver<()>,
}

impl TemplateReloadTask {
    pub fn new(
        interval: Duration,
        engine: Arc<TemplateEngine>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            interval,
            engine,
            shutdown,
        }
    }

    /// Run until a shutdown signal arrives
    pub async fn run(mut self) {
        let mut reload_timer = tokio::time::interval(self.interval);

        // Skip immediate first tick, the engine was loaded at startup
        reload_timer.tick().await;

        tracing::info!(
            reload_interval_secs = self.interval.as_secs(),
            "Template reload task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Template reload task received shutdown signal");
                    break;
                }
                _ = reload_timer.tick() => {
                    match reload_in_background(self.engine.clone()).await {
                        Ok(report) if report.failed_sources > 0 => {
                            tracing::warn!(
                                loaded = report.loaded,
                                failed_sources = report.failed_sources,
                                "Periodic template reload skipped failing sources"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "Periodic template reload task failed");
                        }
                    }
                }
            }
        }

        tracing::info!("Template reload task stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{DirectorySource, VariableBag};

    #[tokio::test(start_paused = true)]
    async fn test_reload_task_picks_up_new_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("first.txt"), "one").unwrap();

        let engine = Arc::new(TemplateEngine::with_sources(vec![Box::new(
            DirectorySource::new(dir.path()),
        )]));
        assert_eq!(engine.list_available(), vec!["first"]);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = TemplateReloadTask::new(Duration::from_secs(5), engine.clone(), shutdown_rx);
        let handle = tokio::spawn(task.run());

        std::fs::write(dir.path().join("second.txt"), "two {{n}}").unwrap();
        tokio::time::sleep(Duration::from_secs(6)).await;

        let vars = VariableBag::new().with("n", 2);
        assert_eq!(engine.render("second", &vars).unwrap(), "two 2");

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_reload_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(TemplateEngine::with_sources(vec![Box::new(
            DirectorySource::new(dir.path()),
        )]));
        assert_eq!(engine.count(), 0);

        std::fs::write(dir.path().join("greeting.txt"), "Hi {{name}}").unwrap();
        let report = tokio_test::assert_ok!(reload_in_background(engine.clone()).await);

        assert_eq!(report, ReloadReport { loaded: 1, failed_sources: 0 });
        assert!(engine.exists("greeting"));
    }

    #[tokio::test]
    async fn test_reload_task_stops_on_shutdown() {
        let engine = Arc::new(TemplateEngine::new());
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = TemplateReloadTask::new(Duration::from_secs(3600), engine, shutdown_rx);
        let handle = tokio::spawn(task.run());

        shutdown_tx.send(()).unwrap();
        tokio_test::assert_ok!(handle.await);
    }
}
