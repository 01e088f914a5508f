use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use tokio::sync::{mpsc, Notify};

/// Single-slot mailbox for world state frames. A newer frame replaces an
/// unsent one, so a slow socket never holds more than one snapshot.
#[derive(Debug)]
pub struct LatestFrame {
    frame: StdMutex<Option<String>>,
    notify: Notify,
}

impl LatestFrame {
    pub(crate) fn new() -> Self {
        Self {
            frame: StdMutex::new(None),
            notify: Notify::new(),
        }
    }

    pub(crate) fn store(&self, payload: String) {
        *self
            .frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(payload);
        self.notify.notify_one();
    }

    pub(crate) fn take_latest(&self) -> Option<String> {
        self.frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    pub(crate) async fn wait_for_update(&self) {
        self.notify.notified().await;
    }
}

/// Handles the transport needs to drive one open session.
///
/// `control_rx` carries welcome and error frames in order. World state only
/// ever arrives through `latest_state`.
pub struct SessionIo {
    pub session_id: String,
    pub control_rx: mpsc::UnboundedReceiver<String>,
    pub latest_state: Arc<LatestFrame>,
}
