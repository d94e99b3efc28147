//! Configuration file watcher for hot-reload support

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::StickConfig;

/// Delay between the first modify event of a burst and the reload
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Config watcher that monitors file changes and sends reloaded configs
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StickConfig>,
}

impl ConfigWatcher {
    /// Create a new config watcher for the specified file
    ///
    /// Returns the watcher and the initially loaded config.
    pub async fn new(config_path: String) -> Result<(Self, StickConfig)> {
        let (tx, rx) = mpsc::channel(10);

        let initial_config = StickConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;

        let config_path_clone = config_path.clone();
        // Set while a reload is scheduled; further events in the window are folded into it
        let reload_pending = Arc::new(AtomicBool::new(false));

        // notify callbacks run on their own OS thread, not in Tokio context
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Modify(_)) {
                        debug!("Config file modified: {:?}", event.paths);

                        if reload_pending.swap(true, Ordering::AcqRel) {
                            return;
                        }

                        let config_path = config_path_clone.clone();
                        let tx = tx.clone();
                        let reload_pending = reload_pending.clone();

                        runtime_handle.spawn(async move {
                            tokio::time::sleep(RELOAD_DEBOUNCE).await;
                            reload_pending.store(false, Ordering::Release);

                            match StickConfig::load(&config_path).await {
                                Ok(new_config) => {
                                    info!("Stick configuration reloaded");
                                    if let Err(e) = tx.send(new_config).await {
                                        error!("Failed to send config update: {}", e);
                                    }
                                }
                                Err(e) => {
                                    warn!("Failed to reload config (keeping old config): {:#}", e);
                                }
                            }
                        });
                    }
                }
                Err(e) => {
                    error!("Watch error: {}", e);
                }
            }
        })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path))?;

        info!("Config file watcher started for: {}", config_path);

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial_config,
        ))
    }

    /// Wait for the next config update
    /// Returns None if the watcher has been closed
    pub async fn next_config(&mut self) -> Option<StickConfig> {
        self.rx.recv().await
    }
}
