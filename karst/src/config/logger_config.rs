use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Logger configuration used by the engine shell.
///
/// `app_level_filter` applies to the karst crates themselves,
/// `level_filter` to everything else in the dependency tree.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoggerConfig {
    pub app_level_filter: LevelFilter,
    pub level_filter: LevelFilter,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            app_level_filter: LevelFilter::Info,
            level_filter: LevelFilter::Warn,
        }
    }
}
