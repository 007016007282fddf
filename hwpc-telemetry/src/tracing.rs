use std::sync::Once;

use hwpc_config::Environment;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

static TEST_TRACING: Once = Once::new();

/// Initializes the global tracing subscriber for a binary.
///
/// Dev output is human-readable and pretty-printed; prod output is compact with targets
/// included. The filter honors `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match environment {
        Environment::Dev => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
        Environment::Prod => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_target(true).with_ansi(false))
                .init();
        }
    }
}

/// Initializes tracing for tests, at most once per process.
///
/// Output goes through the test writer so it interleaves with the harness capture.
pub fn init_test_tracing() {
    TEST_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .init();
    });
}
