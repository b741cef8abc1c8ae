use std::rc::Rc;

use mineboard_client::{
  Board,
  CallOutcome,
  Category,
  CategoryId,
  Declined,
  IdentityGate,
  NewTaskDraft,
  Settlement,
  TaskId,
  Ticket
};
use mineboard_shared::ServerInfo;
use tracing::{
  debug,
  warn
};
use yew::Reducible;

use crate::storage::LocalIdentityStorage;

pub enum BoardAction {
  Loaded {
    categories: Vec<Category>,
    nickname:   Option<String>
  },
  LoadFailed(String),
  RetryLoad,
  ServerInfoLoaded(ServerInfo),
  Refresh,
  CreateTask(NewTaskDraft),
  ToggleCompletion(TaskId),
  ToggleAssignment(TaskId),
  SelectCategory(CategoryId),
  SubmitIdentity(String),
  OpenCreateTask,
  CancelCreateTask,
  Settle(Ticket, CallOutcome)
}

/// Everything the page renders. `board`
/// is `None` until the category list has
/// arrived; `load_attempt` keys the
/// category fetch.
#[derive(Clone, PartialEq, Default)]
pub struct BoardState {
  pub board:          Option<Board>,
  pub load_error:     Option<String>,
  pub load_attempt:   u32,
  pub identity_error: Option<&'static str>,
  pub server_info:    Option<ServerInfo>
}

/// Text shown inside the nickname dialog.
/// Every other decline stays silent.
pub fn identity_error_message(
  declined: Declined
) -> Option<&'static str> {
  match declined {
    | Declined::EmptyNickname => {
      Some("Digite um nick para continuar.")
    }
    | Declined::StorageUnavailable => Some(
      "Não foi possível salvar o nick \
       neste navegador."
    ),
    | Declined::NoIdentity
    | Declined::Busy => None
  }
}

impl BoardState {
  pub fn is_loading(&self) -> bool {
    self
      .board
      .as_ref()
      .is_none_or(Board::is_loading)
      && self.load_error.is_none()
  }

  fn apply(&mut self, action: BoardAction) {
    let action = match action {
      | BoardAction::Loaded {
        categories,
        nickname
      } => {
        let mut board =
          Board::new(categories);
        if let Err(declined) =
          board.start(nickname)
        {
          debug!(%declined, "first refresh declined");
        }
        self.board = Some(board);
        self.load_error = None;
        return;
      }
      | BoardAction::LoadFailed(message) => {
        warn!(%message, "failed to load categories");
        self.load_error = Some(message);
        return;
      }
      | BoardAction::RetryLoad => {
        if self.board.is_none() {
          self.load_error = None;
          self.load_attempt += 1;
        }
        return;
      }
      | BoardAction::ServerInfoLoaded(info) => {
        self.server_info = Some(info);
        return;
      }
      | other => other
    };

    let Some(board) = self.board.as_mut()
    else {
      debug!("board not ready; dropping action");
      return;
    };

    let result = match action {
      | BoardAction::Refresh => {
        board.refresh().map(|_| ())
      }
      | BoardAction::CreateTask(draft) => {
        board.create_task(draft).map(|_| ())
      }
      | BoardAction::ToggleCompletion(
        id
      ) => {
        board
          .toggle_completion(id)
          .map(|_| ())
      }
      | BoardAction::ToggleAssignment(
        id
      ) => {
        board
          .toggle_assignment(id)
          .map(|_| ())
      }
      | BoardAction::SelectCategory(id) => {
        board.set_active_category(id);
        Ok(())
      }
      | BoardAction::SubmitIdentity(
        nickname
      ) => {
        let mut gate = IdentityGate::new(
          LocalIdentityStorage
        );
        let submitted = board
          .submit_identity(&mut gate, &nickname);
        self.identity_error = submitted
          .err()
          .and_then(identity_error_message);
        return;
      }
      | BoardAction::OpenCreateTask => {
        board.open_create_task();
        Ok(())
      }
      | BoardAction::CancelCreateTask => {
        board.cancel_create_task();
        Ok(())
      }
      | BoardAction::Settle(
        ticket,
        outcome
      ) => {
        // The board logs failures; the
        // page only loses its loader.
        if let Settlement::Failed(err) =
          board.settle(ticket, outcome)
        {
          debug!(error = %err, "store call settled with failure");
        }
        return;
      }
      | BoardAction::Loaded { .. }
      | BoardAction::LoadFailed(_)
      | BoardAction::RetryLoad
      | BoardAction::ServerInfoLoaded(_) => {
        return;
      }
    };

    if let Err(declined) = result {
      debug!(%declined, "action declined");
    }
  }
}

impl Reducible for BoardState {
  type Action = BoardAction;

  fn reduce(
    self: Rc<Self>,
    action: Self::Action
  ) -> Rc<Self> {
    let mut next = (*self).clone();
    next.apply(action);
    Rc::new(next)
  }
}

#[cfg(test)]
mod tests {
  use mineboard_client::{
    RemoteCall,
    StoreError,
    Task
  };

  use super::*;

  fn categories() -> Vec<Category> {
    vec![Category {
      id:   1,
      name: "Construção".to_string()
    }]
  }

  fn task(id: TaskId) -> Task {
    Task {
      id,
      title: format!("Task {id}"),
      completed: false,
      created_by: "Alex".to_string(),
      categories: categories(),
      players: Vec::new()
    }
  }

  fn reduce(
    state: Rc<BoardState>,
    action: BoardAction
  ) -> Rc<BoardState> {
    state.reduce(action)
  }

  fn in_flight_ticket(
    state: &BoardState
  ) -> Ticket {
    state
      .board
      .as_ref()
      .and_then(|b| b.in_flight())
      .map(|f| f.ticket)
      .expect("ticket")
  }

  fn loaded(
    nickname: Option<&str>
  ) -> Rc<BoardState> {
    let state = reduce(
      Rc::new(BoardState::default()),
      BoardAction::Loaded {
        categories: categories(),
        nickname:   nickname
          .map(str::to_string)
      }
    );
    let ticket = in_flight_ticket(&state);
    reduce(
      state,
      BoardAction::Settle(
        ticket,
        CallOutcome::Fetched(Ok(vec![task(1)]))
      )
    )
  }

  #[test]
  fn loading_until_categories_then_first_refresh() {
    let state = Rc::new(BoardState::default());
    assert!(state.is_loading());

    let state = reduce(state, BoardAction::Loaded {
      categories: categories(),
      nickname:   Some("Steve".to_string())
    });
    let board =
      state.board.as_ref().expect("board");
    assert!(board.is_loading());
    assert_eq!(
      board.in_flight().map(|f| &f.call),
      Some(&RemoteCall::FetchAll)
    );

    let ticket = in_flight_ticket(&state);
    let state = reduce(
      state,
      BoardAction::Settle(
        ticket,
        CallOutcome::Fetched(Ok(vec![task(1)]))
      )
    );
    assert!(!state.is_loading());
    assert_eq!(
      state.board.as_ref().map(|b| b.tasks().len()),
      Some(1)
    );
  }

  #[test]
  fn actions_without_nickname_are_silent() {
    let state = loaded(None);

    let state = reduce(
      state,
      BoardAction::ToggleCompletion(1)
    );
    let state = reduce(
      state,
      BoardAction::ToggleAssignment(1)
    );
    assert_eq!(state.identity_error, None);
    assert!(!state.is_loading());
    assert!(
      state
        .board
        .as_ref()
        .is_some_and(Board::is_identity_modal_open)
    );
  }

  #[test]
  fn store_failure_only_clears_the_loader() {
    let state = reduce(
      loaded(Some("Steve")),
      BoardAction::ToggleAssignment(1)
    );
    assert!(state.is_loading());

    let ticket = in_flight_ticket(&state);
    let state = reduce(
      state,
      BoardAction::Settle(
        ticket,
        CallOutcome::Mutated(Err(
          StoreError::Unavailable(
            "offline".to_string()
          )
        ))
      )
    );
    assert!(!state.is_loading());
    assert_eq!(state.identity_error, None);
    assert_eq!(
      state.board.as_ref().map(|b| b.tasks().len()),
      Some(1)
    );
  }

  #[test]
  fn identity_messages_cover_only_dialog_errors() {
    assert!(
      identity_error_message(
        Declined::EmptyNickname
      )
      .is_some()
    );
    assert!(
      identity_error_message(
        Declined::StorageUnavailable
      )
      .is_some()
    );
    assert_eq!(
      identity_error_message(
        Declined::NoIdentity
      ),
      None
    );
    assert_eq!(
      identity_error_message(Declined::Busy),
      None
    );
  }

  #[test]
  fn load_failure_stops_the_loader_until_retry() {
    let state = reduce(
      Rc::new(BoardState::default()),
      BoardAction::LoadFailed(
        "offline".to_string()
      )
    );
    assert!(!state.is_loading());
    assert_eq!(
      state.load_error.as_deref(),
      Some("offline")
    );

    let state =
      reduce(state, BoardAction::RetryLoad);
    assert!(state.is_loading());
    assert_eq!(state.load_error, None);
    assert_eq!(state.load_attempt, 1);
  }

  #[test]
  fn server_info_arrives_independently_of_the_board() {
    let info = ServerInfo {
      name:    "ServerdeMine".to_string(),
      address: Some(
        "serverdemine.online".to_string()
      ),
      links:   Vec::new()
    };
    let state = reduce(
      Rc::new(BoardState::default()),
      BoardAction::ServerInfoLoaded(
        info.clone()
      )
    );
    assert_eq!(state.server_info, Some(info));
    assert!(state.board.is_none());
    assert!(state.is_loading());
  }

  #[test]
  fn retry_is_ignored_once_loaded() {
    let state = reduce(
      loaded(Some("Steve")),
      BoardAction::RetryLoad
    );
    assert_eq!(state.load_attempt, 0);
  }
}
