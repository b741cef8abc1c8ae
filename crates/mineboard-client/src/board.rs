use mineboard_shared::{
  Category,
  CategoryId,
  NewTask,
  NewTaskDraft,
  Task,
  TaskId
};
use tracing::{
  debug,
  error,
  info,
  warn
};

use crate::error::{
  Declined,
  StoreError
};
use crate::identity::{
  IdentityGate,
  IdentityStorage
};
use crate::modal::Modals;
use crate::view::{
  self,
  BoardView,
  EmptyState
};

/// Identifies one issued store call.
/// Results carrying an older ticket
/// than the call in flight are dropped.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct Ticket(u64);

impl Ticket {
  pub fn get(self) -> u64 {
    self.0
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
  FetchAll,
  Create(NewTask),
  ToggleCompletion(TaskId),
  ToggleAssignment {
    nickname: String,
    task_id:  TaskId
  }
}

impl RemoteCall {
  pub fn is_mutation(&self) -> bool {
    !matches!(self, RemoteCall::FetchAll)
  }

  pub fn label(&self) -> &'static str {
    match self {
      | RemoteCall::FetchAll => "fetch_all",
      | RemoteCall::Create(_) => "create",
      | RemoteCall::ToggleCompletion(
        _
      ) => "toggle_completion",
      | RemoteCall::ToggleAssignment {
        ..
      } => "toggle_assignment"
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
  pub ticket: Ticket,
  pub call:   RemoteCall
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
  Fetched(Result<Vec<Task>, StoreError>),
  Mutated(Result<(), StoreError>)
}

/// What [`Board::settle`] did with a
/// result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
  /// The task list was replaced.
  Refreshed,
  /// A mutation succeeded and the
  /// follow-up refresh is now in
  /// flight.
  RefreshQueued(Ticket),
  /// The call failed; the loading flag
  /// is cleared and the list untouched.
  Failed(StoreError),
  /// The result did not belong to the
  /// call in flight.
  Stale
}

/// The single owned state container
/// behind the task board.
///
/// Operations that need the store return
/// the [`Ticket`] of the call they left in
/// flight. `is_loading` is exactly "a call
/// is in flight", so it cannot be left set
/// by a failed call.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
  categories:      Vec<Category>,
  tasks:           Vec<Task>,
  active_category: Option<CategoryId>,
  nickname:        Option<String>,
  modals:          Modals,
  in_flight:       Option<InFlight>,
  next_ticket:     u64
}

impl Board {
  pub fn new(
    categories: Vec<Category>
  ) -> Self {
    Self {
      categories,
      tasks: Vec::new(),
      active_category: None,
      nickname: None,
      modals: Modals::default(),
      in_flight: None,
      next_ticket: 1
    }
  }

  pub fn categories(&self) -> &[Category] {
    &self.categories
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn nickname(&self) -> Option<&str> {
    self.nickname.as_deref()
  }

  pub fn is_loading(&self) -> bool {
    self.in_flight.is_some()
  }

  pub fn in_flight(
    &self
  ) -> Option<&InFlight> {
    self.in_flight.as_ref()
  }

  pub fn modals(&self) -> Modals {
    self.modals
  }

  pub fn is_identity_modal_open(
    &self
  ) -> bool {
    self.modals.is_identity_open()
  }

  pub fn is_create_task_modal_open(
    &self
  ) -> bool {
    self.modals.is_create_task_open()
  }

  pub fn active_category(
    &self
  ) -> Option<&Category> {
    let id = self.active_category?;
    self
      .categories
      .iter()
      .find(|category| category.id == id)
  }

  /// Mount: record the resolved nickname
  /// (opening the identity dialog when it
  /// is absent) and issue the first
  /// refresh.
  #[tracing::instrument(skip(self))]
  pub fn start(
    &mut self,
    nickname: Option<String>
  ) -> Result<Ticket, Declined> {
    let nickname = nickname
      .map(|raw| raw.trim().to_string())
      .filter(|raw| !raw.is_empty());
    self
      .modals
      .identity_resolved(nickname.is_some());
    info!(
      has_nickname = nickname.is_some(),
      categories = self.categories.len(),
      "starting task board"
    );
    self.nickname = nickname;
    self.refresh()
  }

  pub fn refresh(
    &mut self
  ) -> Result<Ticket, Declined> {
    self.ensure_idle()?;
    Ok(self.issue(RemoteCall::FetchAll))
  }

  /// Closes the create-task dialog before
  /// the call is issued so the dialog
  /// never waits on the network.
  #[tracing::instrument(skip(self, draft), fields(title_len = draft.title.len(), category_count = draft.categories.len()))]
  pub fn create_task(
    &mut self,
    draft: NewTaskDraft
  ) -> Result<Ticket, Declined> {
    let nickname =
      self.require_identity()?;
    self.ensure_idle()?;
    self.modals.close_create_task();
    Ok(self.issue(RemoteCall::Create(
      draft.with_author(nickname)
    )))
  }

  #[tracing::instrument(skip(self))]
  pub fn toggle_completion(
    &mut self,
    task_id: TaskId
  ) -> Result<Ticket, Declined> {
    self.require_identity()?;
    self.ensure_idle()?;
    Ok(self.issue(
      RemoteCall::ToggleCompletion(
        task_id
      )
    ))
  }

  #[tracing::instrument(skip(self))]
  pub fn toggle_assignment(
    &mut self,
    task_id: TaskId
  ) -> Result<Ticket, Declined> {
    let nickname =
      self.require_identity()?;
    self.ensure_idle()?;
    Ok(self.issue(
      RemoteCall::ToggleAssignment {
        nickname,
        task_id
      }
    ))
  }

  /// Selecting the active category again
  /// clears the filter. Unknown ids are
  /// ignored. Returns the filter now in
  /// effect.
  pub fn set_active_category(
    &mut self,
    category_id: CategoryId
  ) -> Option<CategoryId> {
    if !self
      .categories
      .iter()
      .any(|category| category.id == category_id)
    {
      warn!(
        category_id,
        "ignoring unknown category"
      );
      return self.active_category;
    }

    self.active_category =
      if self.active_category
        == Some(category_id)
      {
        None
      } else {
        Some(category_id)
      };
    debug!(active = ?self.active_category, "category filter changed");
    self.active_category
  }

  /// Persists the nickname through `gate`
  /// and closes the identity dialog. On
  /// failure the dialog stays open and
  /// the identity stays unestablished.
  pub fn submit_identity<S>(
    &mut self,
    gate: &mut IdentityGate<S>,
    nickname: &str
  ) -> Result<(), Declined>
  where
    S: IdentityStorage
  {
    match gate.submit(nickname) {
      | Ok(stored) => {
        self.nickname = Some(stored);
        self.modals.identity_accepted();
        Ok(())
      }
      | Err(declined) => {
        debug!(%declined, "nickname not accepted");
        Err(declined)
      }
    }
  }

  pub fn open_create_task(&mut self) {
    if self.modals.open_create_task() {
      debug!("create-task dialog opened");
    }
  }

  /// Cancel path: discards the draft
  /// with no other effect.
  pub fn cancel_create_task(&mut self) {
    if self.modals.close_create_task() {
      debug!(
        "create-task dialog cancelled"
      );
    }
  }

  /// Feeds the result of the call in
  /// flight back into the board.
  #[tracing::instrument(skip(self, ticket, outcome), fields(ticket = ticket.get()))]
  pub fn settle(
    &mut self,
    ticket: Ticket,
    outcome: CallOutcome
  ) -> Settlement {
    let Some(in_flight) =
      self.in_flight.take()
    else {
      warn!("result arrived with nothing in flight");
      return Settlement::Stale;
    };
    if in_flight.ticket != ticket {
      warn!(
        expected = in_flight.ticket.get(),
        "dropping stale result"
      );
      self.in_flight = Some(in_flight);
      return Settlement::Stale;
    }

    let label = in_flight.call.label();
    match (in_flight.call, outcome) {
      | (
        RemoteCall::FetchAll,
        CallOutcome::Fetched(Ok(tasks))
      ) => {
        info!(
          count = tasks.len(),
          "task list refreshed"
        );
        self.tasks = tasks;
        Settlement::Refreshed
      }
      | (
        call,
        CallOutcome::Mutated(Ok(()))
      ) if call.is_mutation() => {
        debug!(call = label, "mutation applied; refreshing");
        let ticket =
          self.issue(RemoteCall::FetchAll);
        Settlement::RefreshQueued(ticket)
      }
      | (
        _,
        CallOutcome::Fetched(Err(err))
        | CallOutcome::Mutated(Err(err))
      ) => {
        error!(call = label, error = %err, "store call failed");
        Settlement::Failed(err)
      }
      | (_, outcome) => {
        warn!(call = label, ?outcome, "outcome does not match call");
        Settlement::Failed(
          StoreError::Decode(format!(
            "unexpected outcome for \
             {label}"
          ))
        )
      }
    }
  }

  pub fn view(&self) -> BoardView<'_> {
    BoardView::derive(
      &self.tasks,
      self.active_category()
    )
  }

  pub fn filtered_tasks(
    &self
  ) -> Vec<&Task> {
    view::filtered(
      &self.tasks,
      self.active_category
    )
  }

  pub fn pending_tasks(
    &self
  ) -> Vec<&Task> {
    view::pending(&self.filtered_tasks())
  }

  pub fn completed_tasks(
    &self
  ) -> Vec<&Task> {
    view::completed(
      &self.filtered_tasks()
    )
  }

  pub fn empty_state(
    &self
  ) -> Option<EmptyState<'_>> {
    self.view().empty
  }

  /// Whether the current nickname is
  /// among `task`'s players.
  pub fn is_assigned(
    &self,
    task: &Task
  ) -> bool {
    self
      .nickname
      .as_deref()
      .is_some_and(|nickname| {
        task.has_player(nickname)
      })
  }

  fn require_identity(
    &self
  ) -> Result<String, Declined> {
    self.nickname.clone().ok_or_else(|| {
      debug!("declined: no nickname");
      Declined::NoIdentity
    })
  }

  fn ensure_idle(
    &self
  ) -> Result<(), Declined> {
    match &self.in_flight {
      | Some(in_flight) => {
        debug!(
          busy_with = in_flight.call.label(),
          "declined: call in flight"
        );
        Err(Declined::Busy)
      }
      | None => Ok(())
    }
  }

  fn issue(
    &mut self,
    call: RemoteCall
  ) -> Ticket {
    let ticket = Ticket(self.next_ticket);
    self.next_ticket += 1;
    debug!(
      ticket = ticket.get(),
      call = call.label(),
      "issuing store call"
    );
    self.in_flight =
      Some(InFlight { ticket, call });
    ticket
  }
}
