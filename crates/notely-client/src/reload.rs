//! Page reload hook.

use std::sync::Arc;

use tokio::sync::watch;

/// Re-renders the current page after a successful deletion.
pub trait PageReloader: Send + Sync {
    fn reload(&self);
}

/// Reload requests published as a generation counter.
///
/// The host subscribes and re-renders the page each time the counter moves.
#[derive(Debug, Clone)]
pub struct ReloadSignal {
    sender: Arc<watch::Sender<u64>>,
}

impl Default for ReloadSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }

    /// Number of reloads requested so far.
    pub fn generation(&self) -> u64 {
        *self.sender.borrow()
    }
}

impl PageReloader for ReloadSignal {
    fn reload(&self) {
        self.sender.send_modify(|generation| *generation += 1);
        tracing::debug!(generation = self.generation(), "Page reload requested");
    }
}
