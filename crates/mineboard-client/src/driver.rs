use mineboard_shared::{
  Category,
  CategoryId,
  NewTaskDraft,
  TaskId
};
use tracing::{
  debug,
  warn
};

use crate::board::{
  Board,
  CallOutcome,
  RemoteCall,
  Settlement
};
use crate::error::{
  Declined,
  StoreError
};
use crate::identity::{
  IdentityGate,
  IdentityStorage
};
use crate::store::TaskStore;

/// Runs one store call. Created tasks are
/// discarded; the follow-up refresh brings
/// them in.
#[tracing::instrument(skip(store, call), fields(call = call.label()))]
pub async fn execute<S>(
  store: &S,
  call: &RemoteCall
) -> CallOutcome
where
  S: TaskStore + ?Sized
{
  match call {
    | RemoteCall::FetchAll => {
      CallOutcome::Fetched(
        store.get_all().await
      )
    }
    | RemoteCall::Create(task) => {
      CallOutcome::Mutated(
        store
          .create(task.clone())
          .await
          .map(|created| {
            debug!(id = created.id, "task created");
          })
      )
    }
    | RemoteCall::ToggleCompletion(
      task_id
    ) => CallOutcome::Mutated(
      store
        .toggle_completion(*task_id)
        .await
    ),
    | RemoteCall::ToggleAssignment {
      nickname,
      task_id
    } => CallOutcome::Mutated(
      store
        .toggle_assignment(
          nickname, *task_id
        )
        .await
    )
  }
}

/// How an awaited operation ended once
/// nothing was left in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
  Applied,
  Failed(StoreError)
}

impl Settled {
  pub fn is_applied(&self) -> bool {
    matches!(self, Settled::Applied)
  }
}

/// A [`Board`] bundled with its store
/// and identity storage. Each operation
/// returns only after the board is idle
/// again, so callers never observe the
/// loading state.
pub struct TaskBoard<S, I> {
  board:    Board,
  store:    S,
  identity: IdentityGate<I>
}

impl<S, I> TaskBoard<S, I>
where
  S: TaskStore,
  I: IdentityStorage
{
  pub fn new(
    categories: Vec<Category>,
    store: S,
    identity: IdentityGate<I>
  ) -> Self {
    Self {
      board: Board::new(categories),
      store,
      identity
    }
  }

  pub fn board(&self) -> &Board {
    &self.board
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  pub fn identity(
    &self
  ) -> &IdentityGate<I> {
    &self.identity
  }

  /// Resolves the stored nickname and
  /// performs the first refresh.
  pub async fn start(
    &mut self
  ) -> Result<Settled, Declined> {
    let nickname = self.identity.resolve();
    self.board.start(nickname)?;
    Ok(self.drive().await)
  }

  pub async fn refresh(
    &mut self
  ) -> Result<Settled, Declined> {
    self.board.refresh()?;
    Ok(self.drive().await)
  }

  pub async fn create_task(
    &mut self,
    draft: NewTaskDraft
  ) -> Result<Settled, Declined> {
    self.board.create_task(draft)?;
    Ok(self.drive().await)
  }

  pub async fn toggle_completion(
    &mut self,
    task_id: TaskId
  ) -> Result<Settled, Declined> {
    self.board.toggle_completion(task_id)?;
    Ok(self.drive().await)
  }

  pub async fn toggle_assignment(
    &mut self,
    task_id: TaskId
  ) -> Result<Settled, Declined> {
    self.board.toggle_assignment(task_id)?;
    Ok(self.drive().await)
  }

  pub fn set_active_category(
    &mut self,
    category_id: CategoryId
  ) -> Option<CategoryId> {
    self
      .board
      .set_active_category(category_id)
  }

  pub fn submit_identity(
    &mut self,
    nickname: &str
  ) -> Result<(), Declined> {
    self
      .board
      .submit_identity(&mut self.identity, nickname)
  }

  pub fn open_create_task(&mut self) {
    self.board.open_create_task();
  }

  pub fn cancel_create_task(&mut self) {
    self.board.cancel_create_task();
  }

  async fn drive(&mut self) -> Settled {
    loop {
      let Some(in_flight) =
        self.board.in_flight().cloned()
      else {
        warn!("drive called with nothing in flight");
        return Settled::Applied;
      };
      let outcome =
        execute(&self.store, &in_flight.call)
          .await;
      match self
        .board
        .settle(in_flight.ticket, outcome)
      {
        | Settlement::Refreshed => {
          return Settled::Applied;
        }
        | Settlement::RefreshQueued(next) => {
          debug!(
            ticket = next.get(),
            "following up with refresh"
          );
        }
        | Settlement::Failed(err) => {
          return Settled::Failed(err);
        }
        | Settlement::Stale => {
          warn!(
            ticket = in_flight.ticket.get(),
            "in-flight call was replaced"
          );
          return Settled::Applied;
        }
      }
    }
  }
}
