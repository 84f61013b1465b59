use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Home directory could not be resolved")]
    HomeDirUnavailable,
    #[error("Log directory creation error ({}): {source}", path.display())]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Log file opening error ({}): {source}", path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Logger installation error: {0}")]
    Logger(#[from] log::SetLoggerError),
}
