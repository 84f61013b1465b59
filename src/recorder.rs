use log::{error, info};

use crate::probe::{ProbeOutcome, ProbeResult};

/// Destination of check results. Called once per check, in check order.
pub trait Recorder {
    fn record(&self, result: &ProbeResult);
}

/// Writes each result as one structured log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

impl Recorder for LogRecorder {
    fn record(&self, result: &ProbeResult) {
        match &result.outcome {
            ProbeOutcome::Success {
                status_code,
                status,
            } => info!(
                url = result.url.as_str(),
                status_code = *status_code,
                status = status.as_str(),
                elapsed:? = result.elapsed;
                "Site status check"
            ),
            ProbeOutcome::Failure { error, kind } => error!(
                url = result.url.as_str(),
                error = error.as_str(),
                kind:% = kind,
                elapsed:? = result.elapsed;
                "Failed to make HTTP request"
            ),
        }
    }
}
