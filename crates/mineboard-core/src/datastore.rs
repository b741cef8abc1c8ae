use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use mineboard_client::{StoreError, TaskStore};
use mineboard_shared::{Category, CategoryId, NewTask, Player, Task, TaskId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

/// Seeded into `categories.data` the first time a data directory is opened.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Construção", "Exploração", "Automação"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataStoreError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    #[error("unknown category {0}")]
    UnknownCategory(CategoryId),
}

#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    pub tasks_path: PathBuf,
    pub categories_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let tasks_path = data_dir.join("tasks.data");
        let categories_path = data_dir.join("categories.data");

        if !tasks_path.exists() {
            fs::write(&tasks_path, "")?;
        }
        if !categories_path.exists() {
            let defaults: Vec<Category> = DEFAULT_CATEGORIES
                .iter()
                .zip(1..)
                .map(|(name, id)| Category {
                    id,
                    name: (*name).to_string(),
                })
                .collect();
            save_jsonl_atomic(&categories_path, &defaults)
                .context("failed to seed categories.data")?;
            info!(count = defaults.len(), "seeded default categories");
        }

        info!(
            data_dir = %data_dir.display(),
            tasks = %tasks_path.display(),
            categories = %categories_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            tasks_path,
            categories_path,
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn load_categories(&self) -> anyhow::Result<Vec<Category>> {
        load_jsonl(&self.categories_path).context("failed to load categories.data")
    }

    #[tracing::instrument(skip(self))]
    pub fn load_tasks(&self) -> anyhow::Result<Vec<Task>> {
        load_jsonl(&self.tasks_path).context("failed to load tasks.data")
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn save_tasks(&self, tasks: &[Task]) -> anyhow::Result<()> {
        save_jsonl_atomic(&self.tasks_path, tasks).context("failed to save tasks.data")
    }

    pub fn next_id(&self, tasks: &[Task]) -> TaskId {
        tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Resolves category ids against `categories.data` and appends the task.
    #[tracing::instrument(skip(self, new_task), fields(title_len = new_task.title.len(), created_by = %new_task.created_by))]
    pub fn add_task(&self, new_task: NewTask) -> anyhow::Result<Task> {
        let known = self.load_categories()?;
        let mut categories: Vec<Category> = Vec::with_capacity(new_task.categories.len());
        for id in &new_task.categories {
            let category = known
                .iter()
                .find(|category| category.id == *id)
                .ok_or(DataStoreError::UnknownCategory(*id))?;
            if !categories.iter().any(|c| c.id == category.id) {
                categories.push(category.clone());
            }
        }

        let mut tasks = self.load_tasks()?;
        let task = Task {
            id: self.next_id(&tasks),
            title: new_task.title,
            completed: false,
            created_by: new_task.created_by,
            categories,
            players: Vec::new(),
        };
        tasks.push(task.clone());
        tasks.sort_by_key(|t| t.id);
        self.save_tasks(&tasks)?;

        info!(id = task.id, "added task");
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_completion(&self, task_id: TaskId) -> anyhow::Result<Task> {
        self.update_task(task_id, |task| {
            task.completed = !task.completed;
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_assignment(&self, nickname: &str, task_id: TaskId) -> anyhow::Result<Task> {
        self.update_task(task_id, |task| {
            if task.has_player(nickname) {
                task.players.retain(|player| player.name != nickname);
            } else {
                task.players.push(Player {
                    name: nickname.to_string(),
                });
            }
        })
    }

    fn update_task(
        &self,
        task_id: TaskId,
        apply: impl FnOnce(&mut Task),
    ) -> anyhow::Result<Task> {
        let mut tasks = self.load_tasks()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or(DataStoreError::TaskNotFound(task_id))?;
        apply(task);
        let updated = task.clone();
        self.save_tasks(&tasks)?;
        debug!(
            id = updated.id,
            completed = updated.completed,
            players = updated.players.len(),
            "updated task"
        );
        Ok(updated)
    }
}

/// Maps datastore failures onto the taxonomy the board understands.
pub fn to_store_error(err: anyhow::Error) -> StoreError {
    match err.downcast_ref::<DataStoreError>() {
        Some(DataStoreError::TaskNotFound(id)) => StoreError::NotFound(*id),
        Some(DataStoreError::UnknownCategory(id)) => StoreError::Rejected {
            status: 422,
            message: format!("unknown category {id}"),
        },
        None => StoreError::Unavailable(format!("{err:#}")),
    }
}

#[async_trait(?Send)]
impl TaskStore for DataStore {
    async fn get_all(&self) -> Result<Vec<Task>, StoreError> {
        self.load_tasks().map_err(to_store_error)
    }

    async fn create(&self, task: NewTask) -> Result<Task, StoreError> {
        self.add_task(task).map_err(to_store_error)
    }

    async fn toggle_completion(&self, task_id: TaskId) -> Result<(), StoreError> {
        DataStore::toggle_completion(self, task_id)
            .map(|_| ())
            .map_err(to_store_error)
    }

    async fn toggle_assignment(&self, nickname: &str, task_id: TaskId) -> Result<(), StoreError> {
        DataStore::toggle_assignment(self, nickname, task_id)
            .map(|_| ())
            .map_err(to_store_error)
    }
}

#[tracing::instrument(skip(path))]
fn load_jsonl<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    debug!(file = %path.display(), "loading jsonl");
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let item: T = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(item);
    }

    debug!(count = out.len(), "loaded records from jsonl");
    Ok(out)
}

#[tracing::instrument(skip(path, items))]
fn save_jsonl_atomic<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    debug!(file = %path.display(), count = items.len(), "saving jsonl atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    for item in items {
        let serialized = serde_json::to_string(item)?;
        writeln!(temp, "{serialized}")?;
    }
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
