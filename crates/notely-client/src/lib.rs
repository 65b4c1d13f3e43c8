//! notely-client - Delete-note interaction handler
//!
//! Watches clicks inside a notes container, turns clicks on delete controls
//! into `POST /del/{id}` requests, and reloads the page when the endpoint
//! reports success. Failures are logged and leave the page untouched.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod reload;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::{ClientConfig, ConfigError};
pub use error::{Error, Result};
pub use handler::{ClickDisposition, DeletionHandler, DeletionReport, DeletionResult, Installation};
pub use reload::{PageReloader, ReloadSignal};
pub use transport::{DeletionTransport, HttpDeletionTransport, TransportError};
