use std::collections::BTreeSet;

use mineboard_shared::{
  Category,
  CategoryId,
  NewTaskDraft
};
use web_sys::{
  HtmlInputElement,
  InputEvent,
  SubmitEvent
};
use yew::{
  Callback,
  Html,
  Properties,
  TargetCast,
  classes,
  function_component,
  html,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct CreateTaskModalProps {
  pub categories: Vec<Category>,
  pub on_submit:  Callback<NewTaskDraft>,
  pub on_cancel:  Callback<()>
}

#[function_component(CreateTaskModal)]
pub fn create_task_modal(
  props: &CreateTaskModalProps
) -> Html {
  let title = use_state(String::new);
  let selected =
    use_state(BTreeSet::<CategoryId>::new);

  let oninput = {
    let title = title.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        title.set(input.value());
      }
    )
  };

  let onsubmit = {
    let title = title.clone();
    let selected = selected.clone();
    let categories =
      props.categories.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |event: SubmitEvent| {
        event.prevent_default();
        let trimmed = title.trim();
        if trimmed.is_empty() {
          return;
        }
        // Keep the sidebar ordering.
        let ids = categories
          .iter()
          .map(|category| category.id)
          .filter(|id| {
            selected.contains(id)
          })
          .collect();
        on_submit.emit(NewTaskDraft {
          title:      trimmed
            .to_string(),
          categories: ids
        });
      }
    )
  };

  let on_cancel = {
    let on_cancel =
      props.on_cancel.clone();
    Callback::from(move |_| {
      on_cancel.emit(())
    })
  };

  let chips = props
    .categories
    .iter()
    .map(|category| {
      let id = category.id;
      let active = selected.contains(&id);
      let selected = selected.clone();
      let onclick = Callback::from(
        move |_| {
          let mut next =
            (*selected).clone();
          if !next.remove(&id) {
            next.insert(id);
          }
          selected.set(next);
        }
      );
      html! {
        <button
          key={id}
          type="button"
          class={classes!("badge", active.then_some("active"))}
          onclick={onclick}
        >
          { format!("#{}", category.name) }
        </button>
      }
    })
    .collect::<Html>();

  html! {
    <div class="modal-backdrop">
      <form class="modal" onsubmit={onsubmit}>
        <h2>{ "Nova tarefa" }</h2>
        <input
          type="text"
          placeholder="O que precisa ser feito?"
          value={(*title).clone()}
          oninput={oninput}
        />
        <div class="categories">{ chips }</div>
        <div class="actions">
          <button type="button" onclick={on_cancel}>{ "Cancelar" }</button>
          <button type="submit">{ "Criar" }</button>
        </div>
      </form>
    </div>
  }
}
