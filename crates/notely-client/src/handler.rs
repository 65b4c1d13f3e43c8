//! Delete-note interaction handler.
//!
//! One click listener is bound to the notes container. Clicks bubble up to it
//! from any descendant; the handler looks for the nearest delete control
//! between the click target and the container, reads the note id from the
//! control, and sends the deletion request on the tokio runtime so later
//! clicks are never blocked. A successful response reloads the page; any
//! failure is logged and the page stays as it is.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use notely_core::{ClickEvent, DeletionOutcome, Document, NodeId, NoteRef, Selector};
use tokio::runtime::Handle;
use tokio::task::JoinSet;

use crate::config::ClientConfig;
use crate::reload::PageReloader;
use crate::transport::DeletionTransport;

/// Marker set on a container once a handler is bound to it.
pub const BOUND_MARKER: &str = "data-notely-bound";

/// Result of [`DeletionHandler::install`].
#[derive(Debug)]
pub enum Installation {
    /// The listener is registered on the container
    Listening(DeletionHandler),
    /// The container already carries a handler; nothing was registered
    AlreadyListening,
    /// No container on this page; the handler stays inactive
    Inactive,
}

impl Installation {
    pub const fn is_listening(&self) -> bool {
        matches!(self, Self::Listening(_))
    }

    pub fn handler(self) -> Option<DeletionHandler> {
        match self {
            Self::Listening(handler) => Some(handler),
            Self::AlreadyListening | Self::Inactive => None,
        }
    }
}

/// What a single click turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDisposition {
    /// Not a delete click
    Ignored,
    /// A delete control without a usable note id
    MissingNoteId { control: NodeId },
    /// No tokio runtime to run the request on
    Dropped(NoteRef),
    /// Deletion request started
    Dispatched(NoteRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionResult {
    Completed(DeletionOutcome),
    TransportFailed(String),
}

/// Final state of one deletion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub note: NoteRef,
    pub result: DeletionResult,
}

impl DeletionReport {
    /// Whether this deletion triggered a page reload.
    pub const fn reloaded(&self) -> bool {
        matches!(self.result, DeletionResult::Completed(DeletionOutcome::Success))
    }
}

/// Handler bound to one notes container.
///
/// Cloning is cheap; clones share the same in-flight request set. A running
/// request keeps the handler state alive until it finishes, so dropping every
/// clone never cancels a deletion. Requests that finished before the next
/// click are reaped then; their outcome has already been logged.
#[derive(Clone)]
pub struct DeletionHandler {
    inner: Arc<Inner>,
}

struct Inner {
    container: NodeId,
    delete_selector: Selector,
    note_id_attribute: String,
    transport: Arc<dyn DeletionTransport>,
    reloader: Arc<dyn PageReloader>,
    in_flight: Mutex<JoinSet<DeletionReport>>,
}

impl fmt::Debug for DeletionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeletionHandler")
            .field("container", &self.inner.container)
            .field("delete_selector", &self.inner.delete_selector)
            .field("note_id_attribute", &self.inner.note_id_attribute)
            .finish_non_exhaustive()
    }
}

impl DeletionHandler {
    /// Bind the handler to the notes container of `document`.
    ///
    /// A page without a container is not an error: the miss is logged and
    /// the handler never activates. Installing twice on the same container
    /// registers nothing the second time.
    pub fn install(
        document: &mut Document,
        config: &ClientConfig,
        transport: Arc<dyn DeletionTransport>,
        reloader: Arc<dyn PageReloader>,
    ) -> Installation {
        let Some(container) = document.query_selector(&config.container_selector) else {
            tracing::error!(
                selector = %config.container_selector,
                "Notes container element not found"
            );
            return Installation::Inactive;
        };

        if document.attribute(container, BOUND_MARKER).is_some() {
            tracing::warn!(%container, "Delete handler already bound to notes container");
            return Installation::AlreadyListening;
        }

        let handler = Self {
            inner: Arc::new(Inner {
                container,
                delete_selector: config.delete_selector.clone(),
                note_id_attribute: config.note_id_attribute.clone(),
                transport,
                reloader,
                in_flight: Mutex::new(JoinSet::new()),
            }),
        };

        let listener = handler.clone();
        let registered = document
            .add_click_listener(container, move |document, event| {
                listener.handle_click(document, event);
            })
            .and_then(|()| document.set_attribute(container, BOUND_MARKER, "true"));
        if let Err(error) = registered {
            tracing::error!(%container, %error, "Failed to register delete handler");
            return Installation::Inactive;
        }

        tracing::info!(
            %container,
            delete_selector = %config.delete_selector,
            "Delete handler listening"
        );
        Installation::Listening(handler)
    }

    pub fn container(&self) -> NodeId {
        self.inner.container
    }

    /// Resolve a click and, for a delete click, start the deletion request.
    ///
    /// This is what the container's listener runs. It returns immediately;
    /// the request itself runs on the current tokio runtime.
    pub fn handle_click(&self, document: &Document, event: &ClickEvent) -> ClickDisposition {
        let container = self.inner.container;
        if !document
            .ancestors_inclusive(event.target)
            .any(|node| node == container)
        {
            return ClickDisposition::Ignored;
        }

        let Some(control) =
            document.closest_matching(event.target, &self.inner.delete_selector, Some(container))
        else {
            return ClickDisposition::Ignored;
        };

        let Some(note) =
            NoteRef::from_attribute(document.attribute(control, &self.inner.note_id_attribute))
        else {
            tracing::error!(
                %control,
                attribute = %self.inner.note_id_attribute,
                "Delete control has no note id"
            );
            return ClickDisposition::MissingNoteId { control };
        };

        self.spawn_deletion(note)
    }

    fn spawn_deletion(&self, note: NoteRef) -> ClickDisposition {
        let Ok(runtime) = Handle::try_current() else {
            tracing::error!(note_id = %note, "No async runtime available; delete request dropped");
            return ClickDisposition::Dropped(note);
        };

        let inner = Arc::clone(&self.inner);
        let request = note.clone();
        let mut in_flight = self.lock_in_flight();
        reap_finished(&mut in_flight);
        in_flight.spawn_on(async move { inner.delete(request).await }, &runtime);
        tracing::debug!(note_id = %note, in_flight = in_flight.len(), "Delete request started");
        ClickDisposition::Dispatched(note)
    }

    /// Deletions started but not yet settled or reaped.
    pub fn unsettled(&self) -> usize {
        self.lock_in_flight().len()
    }

    /// Wait for every unsettled deletion, in completion order.
    ///
    /// Deletions that had already finished when a later click arrived were
    /// reaped by that click and are not reported again. Clicks arriving
    /// meanwhile start a fresh batch and are not awaited.
    pub async fn settle(&self) -> Vec<DeletionReport> {
        let mut tasks = std::mem::take(&mut *self.lock_in_flight());
        let mut reports = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(error) => tracing::error!(%error, "Delete request task did not complete"),
            }
        }
        reports
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, JoinSet<DeletionReport>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drop finished deletions so the set only holds running requests.
fn reap_finished(in_flight: &mut JoinSet<DeletionReport>) {
    while let Some(joined) = in_flight.try_join_next() {
        if let Err(error) = joined {
            tracing::error!(%error, "Delete request task did not complete");
        }
    }
}

impl Inner {
    async fn delete(&self, note: NoteRef) -> DeletionReport {
        let result = match self.transport.delete_note(&note).await {
            Ok(status) => {
                let outcome = DeletionOutcome::classify(status);
                match outcome {
                    DeletionOutcome::Success => {
                        tracing::info!(note_id = %note, status, "Note deleted, reloading page");
                        self.reloader.reload();
                    }
                    DeletionOutcome::Failure { status, kind } => {
                        tracing::error!(note_id = %note, status, %kind, "Failed to delete note");
                    }
                }
                DeletionResult::Completed(outcome)
            }
            Err(error) => {
                tracing::error!(note_id = %note, %error, "Failed to delete note");
                DeletionResult::TransportFailed(error.to_string())
            }
        };
        DeletionReport { note, result }
    }
}
