use std::path::Path;

use anyhow::Context;
use mineboard_core::datastore::{DataStore, to_store_error};
use mineboard_client::StoreError;
use mineboard_shared::{Category, NewTask, ServerInfo, Task, TaskId};
use parking_lot::Mutex;
use tracing::{debug, instrument};

/// Shared by every request; the datastore is a set of flat files, so all
/// access goes through one lock.
pub struct AppState {
    store: Mutex<DataStore>,
    info: ServerInfo,
}

impl AppState {
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let store = DataStore::open(data_dir)
            .with_context(|| format!("failed to open server datastore at {}", data_dir.display()))?;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: DataStore) -> Self {
        Self {
            store: Mutex::new(store),
            info: ServerInfo::default(),
        }
    }

    pub fn with_info(mut self, info: ServerInfo) -> Self {
        self.info = info;
        self
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    #[instrument(skip(self))]
    pub fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.store.lock().load_categories().map_err(to_store_error)
    }

    #[instrument(skip(self))]
    pub fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = self.store.lock().load_tasks().map_err(to_store_error)?;
        debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    #[instrument(skip(self, new_task), fields(created_by = %new_task.created_by))]
    pub fn create(&self, new_task: NewTask) -> Result<Task, StoreError> {
        self.store.lock().add_task(new_task).map_err(to_store_error)
    }

    #[instrument(skip(self))]
    pub fn toggle_completion(&self, task_id: TaskId) -> Result<(), StoreError> {
        self.store
            .lock()
            .toggle_completion(task_id)
            .map(|_| ())
            .map_err(to_store_error)
    }

    #[instrument(skip(self))]
    pub fn toggle_assignment(&self, nickname: &str, task_id: TaskId) -> Result<(), StoreError> {
        self.store
            .lock()
            .toggle_assignment(nickname, task_id)
            .map(|_| ())
            .map_err(to_store_error)
    }
}
