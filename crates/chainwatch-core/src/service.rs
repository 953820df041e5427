//! Watcher service - wires the monitor, scheduler and command API together

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::api::HttpServer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::monitor::{
    ChainMonitor, DiscordNotifier, MonitorSettings, Notifier, Scheduler, StatusProvider,
    TornClient,
};

/// The main chain watcher service
pub struct ChainWatcher {
    config: Config,
    monitor: Arc<ChainMonitor>,
}

impl ChainWatcher {
    /// Build the watcher from validated configuration
    pub fn new(config: Config) -> Result<Self> {
        let provider: Arc<dyn StatusProvider> = Arc::new(TornClient::new(&config.torn)?);
        let notifier: Arc<dyn Notifier> = Arc::new(DiscordNotifier::new(&config.discord)?);
        Self::with_collaborators(config, provider, notifier)
    }

    /// Build the watcher around the given collaborators
    pub fn with_collaborators(
        config: Config,
        provider: Arc<dyn StatusProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let settings = MonitorSettings::from_config(&config.monitor)?;
        let monitor = Arc::new(ChainMonitor::new(provider, notifier, settings));

        Ok(Self {
            config,
            monitor,
        })
    }

    /// Run the scheduler and the command API until Ctrl+C
    pub async fn start(&self) -> Result<()> {
        self.run_until(async {
            tokio::signal::ctrl_c().await?;
            info!("Ctrl+C received, shutting down...");
            Ok::<(), Error>(())
        })
        .await
    }

    /// Run the scheduler and the command API until `shutdown` completes.
    ///
    /// The command listener is bound before anything is spawned, so a port
    /// that is already taken fails the call instead of leaving a watcher
    /// nobody can enable.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        info!("Starting chain watcher...");

        let listener = HttpServer::bind(&self.config.server.addr()).await?;
        let http_server = HttpServer::new(self.monitor.clone());

        let scheduler_handle =
            Scheduler::new(self.monitor.clone(), self.config.monitor.tick_interval).spawn();

        let http_handle = tokio::spawn(async move {
            if let Err(e) = http_server.serve(listener).await {
                error!("HTTP server error: {}", e);
            }
        });

        let result = shutdown.await;

        scheduler_handle.abort();
        http_handle.abort();

        info!("Chain watcher stopped");
        result
    }

    /// Shared handle to the monitor
    pub fn monitor(&self) -> Arc<ChainMonitor> {
        self.monitor.clone()
    }
}
