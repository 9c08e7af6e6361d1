use anyhow::{Context, Result};
use log::LevelFilter;

use crate::config::LoggingConfig;

pub fn init(config: &LoggingConfig) -> Result<()> {
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.level_filter()?)
        .level_for("sqlx", LevelFilter::Warn);

    let dispatch = match &config.file {
        Some(path) => dispatch.chain(
            fern::log_file(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?,
        ),
        None => dispatch.chain(std::io::stderr()),
    };
    dispatch.apply().context("Failed to install the logger")
}
