//! Fixtures shared by the handler, transport and bootstrap tests.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use notely_core::{Document, NodeId, NoteRef};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::subscriber::DefaultGuard;

use crate::config::ClientConfig;
use crate::transport::{DeletionTransport, TransportError};

pub fn config_for(base_url: &str) -> ClientConfig {
    ClientConfig::from_lookup(|name| (name == "NOTELY_BASE_URL").then(|| base_url.to_string()))
        .unwrap()
}

/// Transport that records every request and answers with a fixed status.
pub struct RecordingTransport {
    status: u16,
    requests: Mutex<Vec<NoteRef>>,
}

impl RecordingTransport {
    pub fn with_status(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<NoteRef> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeletionTransport for RecordingTransport {
    async fn delete_note(&self, note: &NoteRef) -> Result<u16, TransportError> {
        self.requests.lock().unwrap().push(note.clone());
        tokio::task::yield_now().await;
        Ok(self.status)
    }
}

/// `body > div.notes-container > div.note > (p, button.delete-button > i.icon)`
pub struct NotesPage {
    pub document: Document,
    pub container: NodeId,
    pub buttons: Vec<NodeId>,
    pub icons: Vec<NodeId>,
    pub captions: Vec<NodeId>,
}

impl NotesPage {
    pub fn new(ids: &[&str]) -> Self {
        let mut document = Document::new();
        let root = document.root();
        let body = document.create_element("body");
        document.append_child(root, body).unwrap();
        let container = document.create_element("div");
        document.add_class(container, "notes-container").unwrap();
        document.append_child(body, container).unwrap();

        let mut page = Self {
            document,
            container,
            buttons: Vec::new(),
            icons: Vec::new(),
            captions: Vec::new(),
        };
        for id in ids {
            page.add_note(Some(id));
        }
        page
    }

    /// Append a rendered note; `None` renders a control without an id.
    pub fn add_note(&mut self, id: Option<&str>) -> NodeId {
        let document = &mut self.document;
        let note = document.create_element("div");
        document.add_class(note, "note").unwrap();
        document.append_child(self.container, note).unwrap();

        let caption = document.create_element("p");
        document.append_child(note, caption).unwrap();

        let button = document.create_element("button");
        document.add_class(button, "delete-button").unwrap();
        if let Some(id) = id {
            document.set_attribute(button, "data-note-id", id).unwrap();
        }
        document.append_child(note, button).unwrap();

        let icon = document.create_element("i");
        document.add_class(icon, "icon-trash").unwrap();
        document.append_child(button, icon).unwrap();

        self.buttons.push(button);
        self.icons.push(icon);
        self.captions.push(caption);
        button
    }
}

pub fn page_without_container() -> Document {
    let mut document = Document::new();
    let root = document.root();
    let body = document.create_element("body");
    document.append_child(root, body).unwrap();
    let button = document.create_element("button");
    document.add_class(button, "delete-button").unwrap();
    document.set_attribute(button, "data-note-id", "42").unwrap();
    document.append_child(body, button).unwrap();
    document
}

/// Formatted log output captured by [`capture_logs`].
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route this thread's tracing output into a buffer until the guard drops.
pub fn capture_logs() -> (DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let sink = Arc::clone(&buffer.0);
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || LogWriter(Arc::clone(&sink)))
        .finish();
    (tracing::subscriber::set_default(subscriber), buffer)
}

pub fn raw_response(status_line: &str, headers: &[(&str, &str)]) -> String {
    let mut response =
        format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n");
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str("\r\n");
    response
}

/// Serve one canned response per connection, reporting each request line.
pub async fn spawn_server(responses: Vec<String>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let address = listener.local_addr().expect("local address");
    let (sender, receiver) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for response in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut request_buffer = [0_u8; 2048];
            let read = socket.read(&mut request_buffer).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&request_buffer[..read]);
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = sender.send(request_line);
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (format!("http://{address}"), receiver)
}

/// Base URL of a port nobody is listening on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind throwaway listener");
    let address = listener.local_addr().expect("local address");
    drop(listener);
    format!("http://{address}")
}
