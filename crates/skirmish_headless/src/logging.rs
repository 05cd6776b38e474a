//! Log filter for the `skirmish` binary.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG` directives when given, else INFO (DEBUG with
/// `verbose`).
pub fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}
