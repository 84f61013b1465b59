use log::{error, info};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use site_monitor::{
    config::Config, logging, probe::Prober, recorder::LogRecorder, shutdown, worker,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let guard = match logging::init(&config.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(log_file:% = guard.path().display(); "Starting site monitor");

    let prober = match Prober::new(config.timeout) {
        Ok(prober) => prober,
        Err(e) => {
            error!("Failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let token = CancellationToken::new();
    shutdown::cancel_on(shutdown::shutdown_signal(), token.clone());

    worker::monitor_site(&config, &prober, &LogRecorder, token).await;

    drop(guard);
    ExitCode::SUCCESS
}
