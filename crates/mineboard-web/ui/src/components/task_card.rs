use mineboard_shared::{
  Task,
  TaskId
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

/// Nicknames are free text, so they go
/// into the path encoded.
pub fn helm_avatar_url(
  name: &str
) -> String {
  format!(
    "https://mineskin.eu/helm/{}",
    urlencoding::encode(name)
  )
}

#[derive(Properties, PartialEq)]
pub struct TaskCardProps {
  pub task:      Task,
  pub assigned:  bool,
  pub on_toggle_completion:
    Callback<TaskId>,
  pub on_toggle_assignment:
    Callback<TaskId>
}

#[function_component(TaskCard)]
pub fn task_card(
  props: &TaskCardProps
) -> Html {
  let task = &props.task;
  let task_id = task.id;

  let on_check = {
    let on_toggle_completion =
      props.on_toggle_completion.clone();
    Callback::from(move |_| {
      on_toggle_completion.emit(task_id);
    })
  };
  let on_join = {
    let on_toggle_assignment =
      props.on_toggle_assignment.clone();
    Callback::from(move |_| {
      on_toggle_assignment.emit(task_id);
    })
  };

  let check_label = if task.completed {
    "Reabrir"
  } else {
    "Concluir"
  };
  let join_label = if props.assigned {
    "Sair"
  } else {
    "Ajudar"
  };

  let badges = task
    .categories
    .iter()
    .map(|category| {
      html! {
        <span key={category.id} class="badge">
          { format!("#{}", category.name) }
        </span>
      }
    })
    .collect::<Html>();

  let players = task
    .players
    .iter()
    .map(|player| {
      html! {
        <img
          key={player.name.clone()}
          src={helm_avatar_url(&player.name)}
          alt={player.name.clone()}
          title={player.name.clone()}
        />
      }
    })
    .collect::<Html>();

  html! {
    <div class={classes!("task-card", task.completed.then_some("completed"))}>
      <button class="check" onclick={on_check} title={check_label}>
        { if task.completed { "✔" } else { "○" } }
      </button>
      <div class="body">
        <div class="title">{ task.title.clone() }</div>
        <div class="meta">
          <img
            class="author"
            src={helm_avatar_url(&task.created_by)}
            alt={task.created_by.clone()}
          />
          <span>{ format!("* Criada por \"{}\"", task.created_by) }</span>
          { badges }
        </div>
      </div>
      <div class="players">
        <strong>{ "Estão ajudando:" }</strong>
        <button
          class={classes!("join", props.assigned.then_some("assigned"))}
          onclick={on_join}
          title={join_label}
        >
          { if props.assigned { "−" } else { "+" } }
        </button>
        { players }
      </div>
    </div>
  }
}
