use crate::error::SimError;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, File};
use std::path::Path;

/// Logs to the terminal at `level` and, when `log_dir` is given, at DEBUG
/// to a timestamped file inside it. Only the first call takes effect.
pub fn init(level: LevelFilter, log_dir: Option<&Path>) -> Result<(), SimError> {
    let config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir).map_err(|e| SimError::io(dir, e))?;
        let time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let path = dir.join(format!("{}.log", time));
        let file = File::create(&path).map_err(|e| SimError::io(&path, e))?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));
    }
    if CombinedLogger::init(loggers).is_err() {
        log::debug!("logger already installed");
    }
    Ok(())
}
