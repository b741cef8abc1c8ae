mod state;

use mineboard_client::{
  Board,
  Dialog,
  EmptyState,
  IdentityGate,
  InFlight,
  NewTaskDraft,
  Task,
  execute
};
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_reducer
};

pub use self::state::{
  BoardAction,
  BoardState
};
use crate::api::{
  HttpTaskStore,
  fetch_categories,
  fetch_server_info
};
use crate::components::{
  CategorySidebar,
  CreateTaskModal,
  IdentityModal,
  Loader,
  TaskCard
};
use crate::storage::LocalIdentityStorage;

#[function_component(App)]
pub fn app() -> Html {
  let state =
    use_reducer(BoardState::default);

  {
    let dispatcher = state.dispatcher();
    use_effect_with((), move |()| {
      wasm_bindgen_futures::spawn_local(
        async move {
          match fetch_server_info().await {
            | Ok(info) => dispatcher.dispatch(
              BoardAction::ServerInfoLoaded(
                info
              )
            ),
            | Err(err) => tracing::warn!(
              error = %err,
              "server info unavailable"
            )
          }
        }
      );
      || ()
    });
  }

  {
    let dispatcher = state.dispatcher();
    use_effect_with(state.load_attempt, move |attempt| {
      tracing::debug!(attempt, "loading categories");
      let nickname = IdentityGate::new(
        LocalIdentityStorage
      )
      .resolve();
      wasm_bindgen_futures::spawn_local(
        async move {
          match fetch_categories().await {
            | Ok(categories) => dispatcher
              .dispatch(BoardAction::Loaded {
                categories,
                nickname
              }),
            | Err(err) => dispatcher.dispatch(
              BoardAction::LoadFailed(
                err.to_string()
              )
            )
          }
        }
      );
      || ()
    });
  }

  // One store call at a time; a new
  // ticket means a new call to run.
  let in_flight: Option<InFlight> = state
    .board
    .as_ref()
    .and_then(|board| board.in_flight())
    .cloned();
  {
    let dispatcher = state.dispatcher();
    use_effect_with(
      in_flight,
      move |in_flight| {
        if let Some(InFlight {
          ticket,
          call
        }) = in_flight.clone()
        {
          wasm_bindgen_futures::spawn_local(
            async move {
              let outcome = execute(
                &HttpTaskStore,
                &call
              )
              .await;
              dispatcher.dispatch(
                BoardAction::Settle(
                  ticket, outcome
                )
              );
            }
          );
        }
        || ()
      }
    );
  }

  let on_toggle_completion = {
    let dispatcher = state.dispatcher();
    Callback::from(move |id| {
      dispatcher.dispatch(
        BoardAction::ToggleCompletion(id)
      )
    })
  };
  let on_toggle_assignment = {
    let dispatcher = state.dispatcher();
    Callback::from(move |id| {
      dispatcher.dispatch(
        BoardAction::ToggleAssignment(id)
      )
    })
  };

  let on_select_category = {
    let dispatcher = state.dispatcher();
    Callback::from(move |id| {
      dispatcher.dispatch(
        BoardAction::SelectCategory(id)
      )
    })
  };
  let on_refresh = {
    let dispatcher = state.dispatcher();
    Callback::from(move |_| {
      dispatcher
        .dispatch(BoardAction::Refresh)
    })
  };
  let on_open_create = {
    let dispatcher = state.dispatcher();
    Callback::from(move |_| {
      dispatcher.dispatch(
        BoardAction::OpenCreateTask
      )
    })
  };
  let on_cancel_create = {
    let dispatcher = state.dispatcher();
    Callback::from(move |()| {
      dispatcher.dispatch(
        BoardAction::CancelCreateTask
      )
    })
  };
  let on_create = {
    let dispatcher = state.dispatcher();
    Callback::from(
      move |draft: NewTaskDraft| {
        dispatcher.dispatch(
          BoardAction::CreateTask(draft)
        )
      }
    )
  };
  let on_identity = {
    let dispatcher = state.dispatcher();
    Callback::from(
      move |nickname: String| {
        dispatcher.dispatch(
          BoardAction::SubmitIdentity(
            nickname
          )
        )
      }
    )
  };

  let on_retry_load = {
    let dispatcher = state.dispatcher();
    Callback::from(move |_| {
      dispatcher
        .dispatch(BoardAction::RetryLoad)
    })
  };

  let loader = if state.is_loading() {
    html! { <Loader /> }
  } else {
    html! {}
  };

  let Some(board) = state.board.as_ref()
  else {
    return html! {
      <div class="board-shell">
        { loader }
        if let Some(error) = state.load_error.clone() {
          <main class="board-main">
            <p class="empty-state">
              { format!("Não foi possível carregar as categorias: {error}") }
            </p>
            <button onclick={on_retry_load}>{ "Tentar novamente" }</button>
          </main>
        }
      </div>
    };
  };

  let card = |task: &Task| {
    html! {
      <TaskCard
        key={task.id}
        task={task.clone()}
        assigned={board.is_assigned(task)}
        on_toggle_completion={on_toggle_completion.clone()}
        on_toggle_assignment={on_toggle_assignment.clone()}
      />
    }
  };

  let view = board.view();
  let empty = match view.empty {
    | Some(EmptyState::NoTasks) => html! {
      <p class="empty-state">
        { "Nenhuma tarefa ainda. Crie a primeira!" }
      </p>
    },
    | Some(EmptyState::CategoryEmpty(
      category
    )) => html! {
      <p class="empty-state">
        { format!("Nenhuma tarefa em #{}.", category.name) }
      </p>
    },
    | None => html! {}
  };
  let pending = view
    .pending
    .iter()
    .copied()
    .map(|task| card(task))
    .collect::<Html>();
  let completed = view
    .completed
    .iter()
    .copied()
    .map(|task| card(task))
    .collect::<Html>();
  let has_completed =
    !view.completed.is_empty();

  let dialog = render_dialog(
    board,
    state.identity_error,
    on_identity,
    on_create,
    on_cancel_create
  );

  html! {
    <div class="board-shell">
      { loader }
      <CategorySidebar
        categories={board.categories().to_vec()}
        info={state.server_info.clone()}
        active={board.active_category().map(|category| category.id)}
        on_select={on_select_category}
      />
      <main class="board-main">
        <header class="board-header">
          <h1>{ "Tarefas do servidor" }</h1>
          <div class="actions">
            if let Some(nickname) = board.nickname() {
              <span class="nickname">{ nickname.to_string() }</span>
            }
            <button onclick={on_refresh} disabled={board.is_loading()}>
              { "Atualizar" }
            </button>
            <button onclick={on_open_create}>{ "Nova tarefa" }</button>
          </div>
        </header>
        <section class="pending">
          <h2>{ "A fazer" }</h2>
          { empty }
          { pending }
        </section>
        if has_completed {
          <section class="completed">
            <h2>{ "Concluídas" }</h2>
            { completed }
          </section>
        }
      </main>
      { dialog }
    </div>
  }
}

fn render_dialog(
  board: &Board,
  identity_error: Option<&'static str>,
  on_identity: Callback<String>,
  on_create: Callback<NewTaskDraft>,
  on_cancel_create: Callback<()>
) -> Html {
  match board.modals().visible() {
    | Some(Dialog::Identity) => html! {
      <IdentityModal
        error={identity_error.map(str::to_string)}
        on_submit={on_identity}
      />
    },
    | Some(Dialog::CreateTask) => html! {
      <CreateTaskModal
        categories={board.categories().to_vec()}
        on_submit={on_create}
        on_cancel={on_cancel_create}
      />
    },
    | None => html! {}
  }
}
