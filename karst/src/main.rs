mod config;
mod host;
mod logger;
mod resources;
mod saves;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use karst_script::{Driver, Host, Machine};

use crate::config::{app_config::AppConfig, logger_config::LoggerConfig};
use crate::host::EngineHost;
use crate::logger::Logger;
use crate::resources::DirResources;
use crate::saves::DirSaves;

#[derive(Parser, Debug)]
#[command(version, about = "karst adventure engine", long_about = None)]
struct Args {
    /// Configuration file, created with defaults when missing.
    #[arg(short, long, default_value = "karst.json")]
    config: PathBuf,

    /// Override the script resource directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the save directory.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Script resource to boot into slot 0.
    #[arg(short, long, default_value_t = 0)]
    boot: u16,

    /// Fix the script RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Raise the engine log level (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Lower the engine log level (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    quiet: u8,
}

/// Shift a level filter along the off..trace ladder.
fn bump_level(filter: LevelFilter, delta: i8) -> LevelFilter {
    const LADDER: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let here = LADDER.iter().position(|l| *l == filter).unwrap_or(3) as i8;
    let there = (here + delta).clamp(0, LADDER.len() as i8 - 1);
    LADDER[there as usize]
}

fn logger_config(config: &AppConfig, args: &Args) -> Option<LoggerConfig> {
    let mut logger = config.logger.clone()?;
    let delta = args.verbose as i8 - args.quiet as i8;
    logger.app_level_filter = bump_level(logger.app_level_filter, delta);
    Some(logger)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load_or_create(&args.config)?;
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.save_dir {
        config.save_dir = dir.clone();
    }

    Logger::init_logging(logger_config(&config, &args))?;
    log::info!(
        "{} starting, data {}, saves {}",
        config.app_name,
        config.data_dir.display(),
        config.save_dir.display()
    );

    let mut host = EngineHost::new(
        DirResources::new(&config.data_dir),
        DirSaves::new(&config.save_dir),
        config.frame_interval_ms,
    );

    let mut machine = Machine::with_standard_natives();
    if let Some(seed) = args.seed {
        machine.reseed(seed);
    }
    let boot_bytes = host
        .script_bytes(args.boot)
        .with_context(|| format!("boot resource {}", args.boot))?;
    machine.slots_mut().load(0, args.boot, boot_bytes)?;

    Driver::new(config.frame_interval_ms).run(&mut machine, &mut host, 0)?;
    log::info!("engine shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn level_bumps_saturate_at_the_ladder_ends() {
        assert_eq!(bump_level(LevelFilter::Info, 1), LevelFilter::Debug);
        assert_eq!(bump_level(LevelFilter::Info, -2), LevelFilter::Error);
        assert_eq!(bump_level(LevelFilter::Trace, 3), LevelFilter::Trace);
        assert_eq!(bump_level(LevelFilter::Off, -1), LevelFilter::Off);
    }
}
