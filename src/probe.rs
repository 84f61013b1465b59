use chrono::{DateTime, Local};
use reqwest::{Client, StatusCode};
use std::{
    fmt::{self, Write},
    time::{Duration, Instant},
};
use url::Url;

use crate::error::Error;

/// Outcome of one check against the target.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub url: Url,
    pub checked_at: DateTime<Local>,
    pub elapsed: Duration,
    pub outcome: ProbeOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The request completed. Any status code counts, including 4xx and 5xx.
    Success { status_code: u16, status: String },
    /// No response was received.
    Failure { error: String, kind: FailureKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connect,
    Request,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Request => "request",
        })
    }
}

impl ProbeResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success { .. })
    }
}

impl ProbeOutcome {
    fn from_status(status: StatusCode) -> ProbeOutcome {
        ProbeOutcome::Success {
            status_code: status.as_u16(),
            status: status_line(status),
        }
    }

    fn from_error(err: &reqwest::Error) -> ProbeOutcome {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() {
            FailureKind::Connect
        } else {
            FailureKind::Request
        };

        ProbeOutcome::Failure {
            error: report(err),
            kind,
        }
    }
}

/// `"503 Service Unavailable"`, or just the code when it has no known reason.
fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

/// Flattens an error and its sources into one line.
///
/// reqwest's own message only names the URL; the cause (DNS, refused
/// connection, timeout) sits further down the chain.
fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    while let Some(src) = err.source() {
        let _ = write!(s, ": {src}");
        err = src;
    }
    s
}

/// Issues single GET requests with a bounded timeout.
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    /// # Errors
    ///
    /// Returns [`Error::HttpClient`] if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Prober, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Prober { client })
    }

    /// Performs exactly one request against `url`.
    ///
    /// Never fails: transport errors, including the timeout, are reported as
    /// [`ProbeOutcome::Failure`]. The response body is not read; the response
    /// is dropped before returning, which releases the connection.
    pub async fn probe(&self, url: &Url) -> ProbeResult {
        let checked_at = Local::now();
        let start = Instant::now();

        let outcome = match self.client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                drop(response);
                ProbeOutcome::from_status(status)
            }
            Err(err) => ProbeOutcome::from_error(&err),
        };

        ProbeResult {
            url: url.clone(),
            checked_at,
            elapsed: start.elapsed(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(StatusCode::OK), "200 OK");
        assert_eq!(
            status_line(StatusCode::SERVICE_UNAVAILABLE),
            "503 Service Unavailable"
        );
        assert_eq!(status_line(StatusCode::from_u16(599).unwrap()), "599");
    }

    #[test]
    fn test_non_2xx_is_success() {
        let outcome = ProbeOutcome::from_status(StatusCode::NOT_FOUND);
        assert_eq!(
            outcome,
            ProbeOutcome::Success {
                status_code: 404,
                status: "404 Not Found".to_string()
            }
        );
    }

    #[derive(Debug)]
    struct Wrapper(io::Error);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("error sending request")
        }
    }

    impl std::error::Error for Wrapper {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_report_includes_sources() {
        let err = Wrapper(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(report(&err), "error sending request: connection refused");
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Timeout.to_string(), "timeout");
        assert_eq!(FailureKind::Connect.to_string(), "connect");
        assert_eq!(FailureKind::Request.to_string(), "request");
    }
}
