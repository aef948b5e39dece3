use std::sync::Once;
use std::time::{Duration, Instant};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the global `tracing` subscriber. Honors `RUST_LOG`, defaults to `info`.
/// Safe to call more than once; only the first call has an effect.
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        // A subscriber may already be installed by a test harness.
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();
    });
}

/// Wall-clock timer for one workflow stage.
pub struct Telemetry {
    start: Instant,
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }

    /// Returns the elapsed milliseconds and starts measuring the next stage.
    pub fn lap_ms(&mut self) -> u128 {
        let ms = self.elapsed_ms();
        self.start = Instant::now();
        ms
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
