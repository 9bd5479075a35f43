use argus_runtime::{InboxEvent, Publisher};
use tokio::sync::mpsc;

/// Shared handles every axum handler needs: a way to push events at the scheduler
/// and a way to read the latest published snapshot. Cheap to clone — both fields
/// are themselves clone-and-share handles, never owned state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub inbox: mpsc::Sender<InboxEvent>,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(inbox: mpsc::Sender<InboxEvent>, publisher: Publisher) -> Self {
        Self { inbox, publisher }
    }
}
