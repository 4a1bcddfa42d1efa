use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use karst_script::DEFAULT_FRAME_INTERVAL_MS;

use crate::config::logger_config::LoggerConfig;

/// Main configuration used to configure the engine.
/// Please use [`AppConfigBuilder`] if you want to build it from code.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    /// Name of the application.
    pub(crate) app_name: String,
    /// Directory holding the `.ksc` script resources.
    pub(crate) data_dir: PathBuf,
    /// Directory holding the `.ksv` save bank.
    pub(crate) save_dir: PathBuf,
    /// Frame cadence in milliseconds.
    pub(crate) frame_interval_ms: u64,
    /// Logger configuration to use.
    pub(crate) logger: Option<LoggerConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "karst".to_string(),
            data_dir: PathBuf::from("data"),
            save_dir: PathBuf::from("saves"),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            logger: Some(Default::default()),
        }
    }
}

impl AppConfig {
    /// Read the configuration file, or write the defaults there if it does
    /// not exist yet so the user has something to edit.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
        } else {
            let config = Self::default();
            let text = serde_json::to_string_pretty(&config)?;
            std::fs::write(path, text)
                .with_context(|| format!("writing default {}", path.display()))?;
            Ok(config)
        }
    }
}

/// `AppConfigBuilder` is a convenience builder to create an `AppConfig` from code.
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Create a new `AppConfigBuilder` builder
    pub fn new() -> Self {
        Self { config: Default::default() }
    }

    /// Sets the app name, used for the log banner
    pub fn with_app_name(mut self, app_name: String) -> Self {
        self.config.app_name = app_name;
        self
    }

    /// Sets the script resource directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    /// Sets the save bank directory
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.save_dir = dir.into();
        self
    }

    /// Sets the frame cadence
    pub fn with_frame_interval_ms(mut self, ms: u64) -> Self {
        self.config.frame_interval_ms = ms;
        self
    }

    /// Sets the logger configuration for the application
    pub fn with_logger_config(mut self, logger_config: LoggerConfig) -> Self {
        self.config.logger = Some(logger_config);
        self
    }

    /// Retrieves the configuration built
    pub fn get(self) -> AppConfig {
        self.config
    }
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
