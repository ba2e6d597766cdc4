use crate::errors::AppError;
use crate::persist::SaveScheduler;
use crate::storage::{MemoryStore, persist_data};
use crate::tracker::Tracker;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub tracker: Arc<Mutex<Tracker<MemoryStore>>>,
    pub saver: SaveScheduler,
}

impl AppState {
    pub fn new(data_path: PathBuf, tracker: Tracker<MemoryStore>, save_delay: Duration) -> Self {
        Self {
            data_path,
            tracker: Arc::new(Mutex::new(tracker)),
            saver: SaveScheduler::new(save_delay),
        }
    }

    /// Saves deferred edits and writes the data file.
    pub async fn flush(&self) -> Result<(), AppError> {
        let mut tracker = self.tracker.lock().await;
        tracker.flush_pending()?;
        persist_data(&self.data_path, tracker.store().backend()).await
    }
}
