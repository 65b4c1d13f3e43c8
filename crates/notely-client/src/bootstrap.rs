//! Entry point for hosts that render a notes page.
//!
//! Call [`attach`] once the page's document is fully built. It replaces the
//! browser's "document ready" hook with an explicit call.

use std::sync::Arc;

use notely_core::Document;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::handler::{DeletionHandler, Installation};
use crate::reload::PageReloader;
use crate::transport::HttpDeletionTransport;

/// Read configuration from the environment and bind the delete handler.
pub fn attach(document: &mut Document, reloader: Arc<dyn PageReloader>) -> Result<Installation> {
    // Only load .env in development; deployments inject the environment.
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env()?;
    attach_with_config(document, &config, reloader)
}

/// Bind the delete handler with an explicit configuration.
pub fn attach_with_config(
    document: &mut Document,
    config: &ClientConfig,
    reloader: Arc<dyn PageReloader>,
) -> Result<Installation> {
    tracing::debug!(
        base_url = %config.base_url,
        delete_route = %config.delete_route,
        "Attaching delete handler"
    );
    let transport = HttpDeletionTransport::new(config)?;
    Ok(DeletionHandler::install(
        document,
        config,
        Arc::new(transport),
        reloader,
    ))
}
