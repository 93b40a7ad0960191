//! Tracing initialization for the server.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LOG_ENV;

const DEFAULT_FILTER: &str = "careerquiz=info,tower_http=info";

static INIT: Once = Once::new();

/// Installs a fmt subscriber filtered by `CAREERQUIZ_LOG`, falling back to
/// `careerquiz=info,tower_http=info`. Safe to call more than once.
///
/// Never call this from the quiz runner: it writes to stdout, which the
/// terminal UI owns.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
