//! Tracing subscriber setup for the CLI.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{LogCommitError, Result};

pub const DEFAULT_FILTER: &str = "logcommit=info";

/// `RUST_LOG` when set and valid, otherwise `logcommit=info`.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Output goes to stderr so stdout only
/// carries the rendered result. `log` records from dependencies and the
/// `db` module are bridged into tracing.
pub fn init_tracing(json: bool) -> Result<()> {
    tracing_log::LogTracer::init().map_err(|e| LogCommitError::Logging(e.to_string()))?;

    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(json.then(|| {
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(std::io::stderr)
        }));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| LogCommitError::Logging(e.to_string()))
}
