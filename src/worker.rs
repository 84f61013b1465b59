use log::info;
use tokio::{
    select,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::probe::Prober;
use crate::recorder::Recorder;

/// Checks the configured site until `token` is cancelled.
///
/// # Behavior
///
/// - Checks once immediately, without waiting for the first interval
/// - Then checks once per `check_interval`; a check that overruns the
///   interval delays the next tick instead of causing a burst of catch-up ticks
/// - Hands every result to `recorder` before the next check starts
/// - Cancellation is observed between checks: a check in flight always
///   completes and is recorded, and no check starts once cancellation is seen
///
/// # Panics
///
/// Panics if `config.check_interval` is zero.
pub async fn monitor_site<R: Recorder>(
    config: &Config,
    prober: &Prober,
    recorder: &R,
    token: CancellationToken,
) {
    info!("Monitoring {}", config.target);
    info!(
        "Check interval: {} seconds",
        config.check_interval.as_secs()
    );
    info!("Timeout: {} seconds", config.timeout.as_secs());

    recorder.record(&prober.probe(&config.target).await);

    let mut ticker = time::interval_at(
        Instant::now() + config.check_interval,
        config.check_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            biased;
            () = token.cancelled() => {
                info!("Shutting down monitor");
                break;
            }
            _ = ticker.tick() => {
                recorder.record(&prober.probe(&config.target).await);
            }
        }
    }
}
