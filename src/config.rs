use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::error::Error;

/// The single site being watched.
pub const TARGET_URL: &str = "https://riseworks.io";
/// Time between two checks.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(30);
/// Upper bound on one request, connect through response headers.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
/// Log files are named `<prefix>_<YYYY-MM-DD>.log`.
pub const LOG_FILE_PREFIX: &str = "site_monitor";

const LOG_SUBDIR: [&str; 2] = ["riseworks", "logs"];

/// Runtime parameters of the monitor.
///
/// The binary only ever uses [`Config::new`]; the fields are public so tests
/// can point the monitor at a mock server with a short interval.
#[derive(Debug, Clone)]
pub struct Config {
    pub target: Url,
    pub check_interval: Duration,
    pub timeout: Duration,
    pub log_dir: PathBuf,
}

impl Config {
    /// Builds the fixed production configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeDirUnavailable`] when the home directory cannot be
    /// resolved.
    pub fn new() -> Result<Config, Error> {
        Ok(Config {
            target: Url::parse(TARGET_URL)?,
            check_interval: CHECK_INTERVAL,
            timeout: PROBE_TIMEOUT,
            log_dir: Self::default_log_dir()?,
        })
    }

    /// `<home>/riseworks/logs`
    ///
    /// # Errors
    ///
    /// Returns [`Error::HomeDirUnavailable`] when the home directory cannot be
    /// resolved.
    pub fn default_log_dir() -> Result<PathBuf, Error> {
        let mut dir = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        dir.extend(LOG_SUBDIR);
        Ok(dir)
    }
}
