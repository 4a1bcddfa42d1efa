use anyhow::{Context, Result};
use fern::colors::{Color, ColoredLevelConfig};

use crate::config::logger_config::LoggerConfig;

pub struct Logger;

impl Logger {
    /// Install the fern dispatcher. `None` leaves logging uninitialized,
    /// which some embedding tests rely on.
    pub fn init_logging(config: Option<LoggerConfig>) -> Result<()> {
        let Some(config) = config else {
            return Ok(());
        };

        let colors = ColoredLevelConfig::new()
            .trace(Color::BrightBlack)
            .debug(Color::White)
            .info(Color::Green)
            .warn(Color::Yellow)
            .error(Color::Red);

        fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "[{}][{}][{}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.target(),
                    colors.color(record.level()),
                    message
                ))
            })
            .level(config.level_filter)
            .level_for("karst", config.app_level_filter)
            .level_for("karst_script", config.app_level_filter)
            .level_for("karst_dasm", config.app_level_filter)
            .chain(std::io::stdout())
            .apply()
            .context("logger installed twice")?;
        Ok(())
    }
}
