//! Periodic availability check of a single site.
//!
//! One request per tick, one log record per request, written to the console
//! and to a daily file under `~/riseworks/logs`.

pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod recorder;
pub mod shutdown;
pub mod worker;
