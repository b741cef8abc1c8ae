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
  function_component,
  html,
  use_state
};

#[derive(Properties, PartialEq)]
pub struct IdentityModalProps {
  pub error:     Option<String>,
  pub on_submit: Callback<String>
}

/// Asks for the Minecraft nickname.
/// Cannot be dismissed without one.
#[function_component(IdentityModal)]
pub fn identity_modal(
  props: &IdentityModalProps
) -> Html {
  let nickname = use_state(String::new);

  let oninput = {
    let nickname = nickname.clone();
    Callback::from(
      move |event: InputEvent| {
        let input: HtmlInputElement =
          event.target_unchecked_into();
        nickname.set(input.value());
      }
    )
  };

  let onsubmit = {
    let nickname = nickname.clone();
    let on_submit =
      props.on_submit.clone();
    Callback::from(
      move |event: SubmitEvent| {
        event.prevent_default();
        on_submit
          .emit((*nickname).clone());
      }
    )
  };

  html! {
    <div class="modal-backdrop">
      <form class="modal" onsubmit={onsubmit}>
        <h2>{ "Qual é o seu nick no Minecraft?" }</h2>
        <input
          type="text"
          placeholder="Steve"
          value={(*nickname).clone()}
          oninput={oninput}
        />
        if let Some(error) = props.error.clone() {
          <p class="error">{ error }</p>
        }
        <button type="submit">{ "Entrar" }</button>
      </form>
    </div>
  }
}
