// src/logging.rs

use crate::config::Config;
use crate::errors::{ColloquyError, ColloquyResult};
use chrono::Utc;
use flexi_logger::{FileSpec, Logger, LoggerHandle};
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;

/// Routes the `log` macros to a file so they never draw over the terminal
/// UI. The returned handle must stay alive for the life of the program.
pub fn init_logging(config: &Config) -> ColloquyResult<LoggerHandle> {
    Logger::try_with_str(&config.log_level)
        .map_err(|e| ColloquyError::config_error(format!("bad log level: {}", e)))?
        .log_to_file(
            FileSpec::default()
                .basename("colloquy")
                .suppress_timestamp(),
        )
        .append()
        .start()
        .map_err(|e| ColloquyError::config_error(format!("failed to start logger: {}", e)))
}

/// Appends one line per completed exchange to `exchanges.log`.
pub fn record_exchange(endpoint: &str, status: u16, bytes: usize, elapsed: Duration) {
    let entry = format!(
        "[{}] {} - Status: {} - Bytes: {} - Time: {}ms\n",
        Utc::now().to_rfc3339(),
        endpoint,
        status,
        bytes,
        elapsed.as_millis()
    );

    let mut file = match OpenOptions::new()
        .append(true)
        .create(true)
        .open("exchanges.log")
    {
        Ok(file) => file,
        Err(e) => {
            log::warn!("failed to open exchanges.log: {}", e);
            return;
        }
    };

    if let Err(e) = file.write_all(entry.as_bytes()) {
        log::warn!("failed to write to exchanges.log: {}", e);
    }
}
