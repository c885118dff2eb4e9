use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::rolling_file::policy::compound::{
    roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::fs;
use std::path::Path;

const LOG_FILE_NAME: &str = "onedrive-fs-bridge.log";
const ROLL_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const ROLL_COUNT: u32 = 3;

/// Build the console + rolling file configuration under `log_dir/logs`
pub fn build_logging_config(log_dir: &Path, level: LevelFilter) -> Result<Config> {
    let logs_dir = log_dir.join("logs");
    fs::create_dir_all(&logs_dir).context("Failed to create logs directory")?;

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{h({l})} {d(%Y-%m-%d %H:%M:%S)} {t} - {m}{n}",
        )))
        .build();

    // keep 3 gzip archives next to the live file
    let archive_pattern = logs_dir.join("onedrive-fs-bridge.{}.log.gz");
    let roller = FixedWindowRoller::builder()
        .base(1)
        .build(&archive_pattern.to_string_lossy(), ROLL_COUNT)
        .context("Failed to build log roller")?;
    let policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(ROLL_SIZE_BYTES)),
        Box::new(roller),
    );

    let file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d} {l} {t}::{m}{n}")))
        .build(logs_dir.join(LOG_FILE_NAME), Box::new(policy))
        .context("Failed to build rolling file appender")?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("file", Box::new(file)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(level),
        )
        .context("Failed to build logging config")?;
    Ok(config)
}

/// Install the log4rs backend. Hosts that already own a `log` backend skip this.
pub fn setup_logging(log_dir: &Path, level: LevelFilter) -> Result<()> {
    let config = build_logging_config(log_dir, level)?;
    log4rs::init_config(config).context("Failed to install logger")?;
    Ok(())
}
