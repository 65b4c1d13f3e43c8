//! Logging setup.
//!
//! Filters come from `RUST_LOG`, with `notely_client=info` always added so
//! delete diagnostics are visible by default.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "notely_client=info";

/// Install the global fmt subscriber.
///
/// Safe to call more than once; later calls report the existing subscriber as
/// an error instead of panicking.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(filter()?)
        .try_init()?;
    Ok(())
}

fn filter() -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
    Ok(EnvFilter::from_default_env().add_directive(DEFAULT_DIRECTIVE.parse()?))
}
