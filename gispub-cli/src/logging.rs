//! Log subscriber installation for the binary.

use tracing::Level;
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use crate::CliError;

/// Route `log` records from the library crates into a fmt subscriber.
///
/// `debug` raises the level from INFO to DEBUG.
pub(crate) fn init(debug: bool) -> Result<(), CliError> {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    LogTracer::init().map_err(|err| CliError::Logging {
        message: err.to_string(),
    })?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|err| CliError::Logging {
        message: err.to_string(),
    })
}
