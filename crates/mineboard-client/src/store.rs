use std::cell::{
  Cell,
  RefCell
};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use mineboard_shared::{
  Category,
  NewTask,
  Player,
  Task,
  TaskId
};
use tracing::debug;

use crate::error::StoreError;

/// The remote source of truth for
/// tasks. Implementations own
/// persistence and category ownership;
/// every failure must surface as an
/// `Err` rather than stale data.
#[async_trait(?Send)]
pub trait TaskStore {
  async fn get_all(
    &self
  ) -> Result<Vec<Task>, StoreError>;

  async fn create(
    &self,
    task: NewTask
  ) -> Result<Task, StoreError>;

  async fn toggle_completion(
    &self,
    task_id: TaskId
  ) -> Result<(), StoreError>;

  async fn toggle_assignment(
    &self,
    nickname: &str,
    task_id: TaskId
  ) -> Result<(), StoreError>;
}

#[async_trait(?Send)]
impl<T> TaskStore for Rc<T>
where
  T: TaskStore + ?Sized
{
  async fn get_all(
    &self
  ) -> Result<Vec<Task>, StoreError> {
    (**self).get_all().await
  }

  async fn create(
    &self,
    task: NewTask
  ) -> Result<Task, StoreError> {
    (**self).create(task).await
  }

  async fn toggle_completion(
    &self,
    task_id: TaskId
  ) -> Result<(), StoreError> {
    (**self)
      .toggle_completion(task_id)
      .await
  }

  async fn toggle_assignment(
    &self,
    nickname: &str,
    task_id: TaskId
  ) -> Result<(), StoreError> {
    (**self)
      .toggle_assignment(nickname, task_id)
      .await
  }
}

/// One recorded call against a
/// [`MemoryTaskStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
  GetAll,
  Create(NewTask),
  ToggleCompletion(TaskId),
  ToggleAssignment {
    nickname: String,
    task_id:  TaskId
  }
}

/// In-process store with a call log
/// and injectable failures.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
  categories: Vec<Category>,
  tasks:      RefCell<Vec<Task>>,
  next_id:    Cell<TaskId>,
  calls:      RefCell<Vec<StoreCall>>,
  failures:   RefCell<VecDeque<StoreError>>
}

impl MemoryTaskStore {
  pub fn new(
    categories: Vec<Category>
  ) -> Self {
    Self {
      categories,
      next_id: Cell::new(1),
      ..Self::default()
    }
  }

  pub fn with_tasks(
    categories: Vec<Category>,
    tasks: Vec<Task>
  ) -> Self {
    let next_id = tasks
      .iter()
      .map(|task| task.id)
      .max()
      .unwrap_or(0)
      + 1;
    Self {
      categories,
      tasks: RefCell::new(tasks),
      next_id: Cell::new(next_id),
      ..Self::default()
    }
  }

  /// The next call fails with `error`
  /// instead of touching the data.
  pub fn fail_next(
    &self,
    error: StoreError
  ) {
    self
      .failures
      .borrow_mut()
      .push_back(error);
  }

  pub fn calls(&self) -> Vec<StoreCall> {
    self.calls.borrow().clone()
  }

  pub fn clear_calls(&self) {
    self.calls.borrow_mut().clear();
  }

  pub fn snapshot(&self) -> Vec<Task> {
    self.tasks.borrow().clone()
  }

  pub fn task(
    &self,
    task_id: TaskId
  ) -> Option<Task> {
    self
      .tasks
      .borrow()
      .iter()
      .find(|task| task.id == task_id)
      .cloned()
  }

  /// Removes a task behind the
  /// board's back, as another member
  /// would.
  pub fn remove(
    &self,
    task_id: TaskId
  ) -> bool {
    let mut tasks =
      self.tasks.borrow_mut();
    let before = tasks.len();
    tasks.retain(|task| {
      task.id != task_id
    });
    tasks.len() != before
  }

  fn record(
    &self,
    call: StoreCall
  ) -> Result<(), StoreError> {
    debug!(?call, "memory store call");
    self.calls.borrow_mut().push(call);
    match self
      .failures
      .borrow_mut()
      .pop_front()
    {
      | Some(error) => Err(error),
      | None => Ok(())
    }
  }

  fn with_task<R>(
    &self,
    task_id: TaskId,
    apply: impl FnOnce(&mut Task) -> R
  ) -> Result<R, StoreError> {
    let mut tasks =
      self.tasks.borrow_mut();
    let task = tasks
      .iter_mut()
      .find(|task| task.id == task_id)
      .ok_or(StoreError::NotFound(
        task_id
      ))?;
    Ok(apply(task))
  }
}

#[async_trait(?Send)]
impl TaskStore for MemoryTaskStore {
  async fn get_all(
    &self
  ) -> Result<Vec<Task>, StoreError> {
    self.record(StoreCall::GetAll)?;
    Ok(self.snapshot())
  }

  async fn create(
    &self,
    task: NewTask
  ) -> Result<Task, StoreError> {
    self.record(StoreCall::Create(
      task.clone()
    ))?;

    let mut categories = Vec::new();
    for id in &task.categories {
      let category = self
        .categories
        .iter()
        .find(|category| category.id == *id)
        .ok_or_else(|| {
          StoreError::Rejected {
            status:  422,
            message: format!(
              "unknown category {id}"
            )
          }
        })?;
      if !categories.contains(category) {
        categories.push(category.clone());
      }
    }

    let id = self.next_id.get();
    self.next_id.set(id + 1);
    let created = Task {
      id,
      title: task.title,
      completed: false,
      created_by: task.created_by,
      categories,
      players: Vec::new()
    };
    self
      .tasks
      .borrow_mut()
      .push(created.clone());
    Ok(created)
  }

  async fn toggle_completion(
    &self,
    task_id: TaskId
  ) -> Result<(), StoreError> {
    self.record(
      StoreCall::ToggleCompletion(
        task_id
      )
    )?;
    self.with_task(task_id, |task| {
      task.completed = !task.completed;
    })
  }

  async fn toggle_assignment(
    &self,
    nickname: &str,
    task_id: TaskId
  ) -> Result<(), StoreError> {
    self.record(
      StoreCall::ToggleAssignment {
        nickname: nickname.to_string(),
        task_id
      }
    )?;
    self.with_task(task_id, |task| {
      if task.has_player(nickname) {
        task.players.retain(|player| {
          player.name != nickname
        });
      } else {
        task.players.push(Player {
          name: nickname.to_string()
        });
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn categories() -> Vec<Category> {
    vec![Category {
      id:   1,
      name: "Construção".to_string()
    }]
  }

  #[tokio::test]
  async fn create_assigns_ids_and_resolves_categories()
  {
    let store =
      MemoryTaskStore::new(categories());
    let created = store
      .create(NewTask {
        title:      "Build wall"
          .to_string(),
        categories: vec![1, 1],
        created_by: "Steve".to_string()
      })
      .await
      .expect("create task");

    assert_eq!(created.id, 1);
    assert_eq!(created.categories.len(), 1);
    assert_eq!(
      created.categories[0].name,
      "Construção"
    );
  }

  #[tokio::test]
  async fn create_rejects_unknown_category()
  {
    let store =
      MemoryTaskStore::new(categories());
    let result = store
      .create(NewTask {
        title:      "Dig".to_string(),
        categories: vec![9],
        created_by: "Steve".to_string()
      })
      .await;

    assert!(matches!(
      result,
      Err(StoreError::Rejected {
        status: 422,
        ..
      })
    ));
    assert!(store.snapshot().is_empty());
  }

  #[tokio::test]
  async fn toggles_fail_on_unknown_id() {
    let store =
      MemoryTaskStore::new(categories());
    assert_eq!(
      store.toggle_completion(4).await,
      Err(StoreError::NotFound(4))
    );
    assert_eq!(
      store
        .toggle_assignment("Steve", 4)
        .await,
      Err(StoreError::NotFound(4))
    );
  }

  #[tokio::test]
  async fn injected_failure_is_consumed_once()
  {
    let store =
      MemoryTaskStore::new(categories());
    store.fail_next(
      StoreError::Unavailable(
        "offline".to_string()
      )
    );
    assert!(store.get_all().await.is_err());
    assert!(store.get_all().await.is_ok());
    assert_eq!(
      store.calls(),
      vec![
        StoreCall::GetAll,
        StoreCall::GetAll
      ]
    );
  }
}
