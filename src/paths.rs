//! Config and log locations for the `vstick` host.
//!
//! ## Mode Detection
//!
//! - **Dev mode**: a `vstick.yaml` in the current working directory wins.
//!   Logs go to `./logs`.
//! - **Installed mode** (default): config in the platform config dir
//!   (`~/.config/virtual-stick/config.yaml` on Linux), logs in the platform
//!   data dir.
//!
//! An explicit `--config` path overrides both; logs then sit next to it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::config::StickConfig;

/// Directory name used under the platform config/data dirs
const APP_NAME: &str = "virtual-stick";

/// Config file picked up from the working directory in dev mode
pub const DEV_CONFIG_FILE: &str = "vstick.yaml";

/// Default log file name inside `logs_dir`
pub const LOG_FILE: &str = "vstick.log";

#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    /// Path to the stick configuration file
    pub config: PathBuf,
    /// Directory holding the default log file
    pub logs_dir: PathBuf,
    /// Config lives next to the working tree rather than in the user profile
    pub is_local: bool,
}

impl AppPaths {
    /// Resolve paths from the environment, honouring an explicit config path.
    ///
    /// Called before logging is initialized, so nothing here logs.
    pub fn detect(explicit_config: Option<&Path>) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve(explicit_config, &cwd, dirs::config_dir(), dirs::data_dir())
    }

    fn resolve(
        explicit_config: Option<&Path>,
        cwd: &Path,
        config_root: Option<PathBuf>,
        data_root: Option<PathBuf>,
    ) -> Self {
        if let Some(config) = explicit_config {
            let base = config
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf());
            return Self {
                config: config.to_path_buf(),
                logs_dir: base.join("logs"),
                is_local: true,
            };
        }

        let dev_config = cwd.join(DEV_CONFIG_FILE);
        if dev_config.exists() {
            return Self {
                config: dev_config,
                logs_dir: cwd.join("logs"),
                is_local: true,
            };
        }

        let config_dir = config_root.unwrap_or_else(|| cwd.to_path_buf()).join(APP_NAME);
        let data_dir = data_root.unwrap_or_else(|| config_dir.clone()).join(APP_NAME);

        Self {
            config: config_dir.join("config.yaml"),
            logs_dir: data_dir.join("logs"),
            is_local: false,
        }
    }

    /// Directory holding the config file
    pub fn base_dir(&self) -> PathBuf {
        self.config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Log file used when none is given on the command line
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir.join(LOG_FILE)
    }

    /// Create the logs directory and, in installed mode, the config directory
    /// with a default config file when none exists yet.
    pub fn ensure_directories(&self) -> anyhow::Result<()> {
        if !self.logs_dir.exists() {
            debug!("Creating logs directory: {}", self.logs_dir.display());
            std::fs::create_dir_all(&self.logs_dir).with_context(|| {
                format!("Failed to create logs directory: {}", self.logs_dir.display())
            })?;
        }

        if !self.is_local {
            let base = self.base_dir();
            if !base.exists() {
                debug!("Creating config directory: {}", base.display());
                std::fs::create_dir_all(&base)
                    .with_context(|| format!("Failed to create config directory: {}", base.display()))?;
            }

            if !self.config.exists() {
                self.write_default_config()?;
            }
        }

        Ok(())
    }

    fn write_default_config(&self) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(&StickConfig::default())
            .context("Failed to serialize default config")?;
        std::fs::write(&self.config, yaml)
            .with_context(|| format!("Failed to write default config: {}", self.config.display()))?;
        info!("Wrote default config to {}", self.config.display());
        Ok(())
    }
}
