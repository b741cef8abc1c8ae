use yew::{
  Html,
  function_component,
  html
};

/// Full-screen overlay shown while a
/// store call is in flight.
#[function_component(Loader)]
pub fn loader() -> Html {
  html! {
    <div class="loader" role="status" aria-label="Carregando">
      <div class="spinner"></div>
    </div>
  }
}
