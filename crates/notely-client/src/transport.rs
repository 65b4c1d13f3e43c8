//! HTTP transport for note deletion requests.

use async_trait::async_trait;
use notely_core::NoteRef;
use reqwest::header::ACCEPT;
use thiserror::Error;

use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to construct HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Delete request failed: {0}")]
    Request(#[source] reqwest::Error),
}

/// Sends a deletion request for one note and reports the response status.
#[async_trait]
pub trait DeletionTransport: Send + Sync {
    /// Returns the final HTTP status; the response body is never read.
    async fn delete_note(&self, note: &NoteRef) -> Result<u16, TransportError>;
}

/// `POST {base_url}{delete_route}/{id}` over reqwest.
///
/// No timeout is configured. Redirects are followed, so the endpoint's
/// `303 See Other` back to the index page resolves to the index status.
#[derive(Debug, Clone)]
pub struct HttpDeletionTransport {
    base_url: String,
    delete_route: String,
    client: reqwest::Client,
}

impl HttpDeletionTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self {
            base_url: config.base_url.clone(),
            delete_route: config.delete_route.clone(),
            client,
        })
    }

    /// Deletion URL for `note`, with the id percent-encoded as one path segment.
    pub fn deletion_url(&self, note: &NoteRef) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            self.delete_route,
            urlencoding::encode(note.as_str())
        )
    }
}

#[async_trait]
impl DeletionTransport for HttpDeletionTransport {
    async fn delete_note(&self, note: &NoteRef) -> Result<u16, TransportError> {
        let url = self.deletion_url(note);
        tracing::debug!(note_id = %note, %url, "Sending delete request");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "text/html")
            .send()
            .await
            .map_err(TransportError::Request)?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_support::{closed_port_url, config_for, raw_response, spawn_server};

    #[test]
    fn deletion_url_encodes_id_as_single_segment() {
        let transport = HttpDeletionTransport::new(&config_for("http://localhost:8000/")).unwrap();
        assert_eq!(
            transport.deletion_url(&NoteRef::from("65f1c0ffee")),
            "http://localhost:8000/del/65f1c0ffee"
        );
        assert_eq!(
            transport.deletion_url(&NoteRef::from("a b/c")),
            "http://localhost:8000/del/a%20b%2Fc"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_note_posts_to_deletion_route() {
        let (base_url, mut requests) = spawn_server(vec![raw_response("200 OK", &[])]).await;
        let transport = HttpDeletionTransport::new(&config_for(&base_url)).unwrap();

        let status = transport.delete_note(&NoteRef::from("42")).await.unwrap();

        assert_eq!(status, 200);
        assert_eq!(requests.recv().await.unwrap(), "POST /del/42 HTTP/1.1");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_note_follows_see_other_redirect() {
        let (base_url, mut requests) = spawn_server(vec![
            raw_response("303 See Other", &[("location", "/")]),
            raw_response("200 OK", &[]),
        ])
        .await;
        let transport = HttpDeletionTransport::new(&config_for(&base_url)).unwrap();

        let status = transport.delete_note(&NoteRef::from("42")).await.unwrap();

        assert_eq!(status, 200);
        assert_eq!(requests.recv().await.unwrap(), "POST /del/42 HTTP/1.1");
        assert_eq!(requests.recv().await.unwrap(), "GET / HTTP/1.1");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_note_reports_failure_status() {
        let (base_url, _requests) =
            spawn_server(vec![raw_response("404 Not Found", &[])]).await;
        let transport = HttpDeletionTransport::new(&config_for(&base_url)).unwrap();

        let status = transport.delete_note(&NoteRef::from("42")).await.unwrap();
        assert_eq!(status, 404);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn delete_note_surfaces_connection_failure() {
        let transport = HttpDeletionTransport::new(&config_for(&closed_port_url().await)).unwrap();

        let error = transport
            .delete_note(&NoteRef::from("42"))
            .await
            .expect_err("nothing is listening");
        assert!(matches!(error, TransportError::Request(_)));
        assert!(error.to_string().contains("Delete request failed"));
    }
}
