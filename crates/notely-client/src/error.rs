//! Error types for notely-client

use thiserror::Error;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// Result type alias using notely-client's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop the handler from being set up.
///
/// Runtime failures (missing container, failed deletions) are never
/// returned; they are logged and reflected in handler return values.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
