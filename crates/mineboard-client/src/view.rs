//! Views derived from board state.
//! Nothing here is stored; every read
//! recomputes from the task list and
//! keeps the order of the last refresh.

use mineboard_shared::{
  Category,
  CategoryId,
  Task
};

pub fn filtered(
  tasks: &[Task],
  active: Option<CategoryId>
) -> Vec<&Task> {
  match active {
    | Some(category_id) => tasks
      .iter()
      .filter(|task| {
        task.has_category(category_id)
      })
      .collect(),
    | None => tasks.iter().collect()
  }
}

pub fn pending<'a>(
  tasks: &[&'a Task]
) -> Vec<&'a Task> {
  tasks
    .iter()
    .copied()
    .filter(|task| !task.completed)
    .collect()
}

pub fn completed<'a>(
  tasks: &[&'a Task]
) -> Vec<&'a Task> {
  tasks
    .iter()
    .copied()
    .filter(|task| task.completed)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState<'a> {
  /// No task exists and no filter is
  /// active.
  NoTasks,
  /// The active category has no tasks.
  CategoryEmpty(&'a Category)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView<'a> {
  pub filtered:  Vec<&'a Task>,
  pub pending:   Vec<&'a Task>,
  pub completed: Vec<&'a Task>,
  pub empty:     Option<EmptyState<'a>>
}

impl<'a> BoardView<'a> {
  pub fn derive(
    tasks: &'a [Task],
    active: Option<&'a Category>
  ) -> Self {
    let filtered = filtered(
      tasks,
      active.map(|category| category.id)
    );
    let pending = pending(&filtered);
    let completed = completed(&filtered);
    let empty = if filtered.is_empty() {
      Some(match active {
        | Some(category) => {
          EmptyState::CategoryEmpty(
            category
          )
        }
        | None => EmptyState::NoTasks
      })
    } else {
      None
    };

    Self {
      filtered,
      pending,
      completed,
      empty
    }
  }
}
