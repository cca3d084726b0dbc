//! Console tracing setup for the loopscribe binary.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Environment variable holding an optional tracing filter override.
pub const LOG_ENV_VAR: &str = "LOOPSCRIBE_LOG";

/// Installs the console subscriber once; later calls are no-ops. Runtime
/// errors (missing transcript, flapping device) are logged here and are
/// otherwise invisible; the pipeline keeps running through them.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
