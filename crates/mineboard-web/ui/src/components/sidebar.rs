use mineboard_shared::{
  Category,
  CategoryId,
  ServerInfo
};
use yew::{
  Callback,
  Html,
  Properties,
  classes,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct CategorySidebarProps {
  pub categories: Vec<Category>,
  #[prop_or_default]
  pub info:       Option<ServerInfo>,
  pub active:     Option<CategoryId>,
  pub on_select:  Callback<CategoryId>
}

#[function_component(CategorySidebar)]
pub fn category_sidebar(
  props: &CategorySidebarProps
) -> Html {
  let items = props
    .categories
    .iter()
    .map(|category| {
      let id = category.id;
      let active =
        props.active == Some(id);
      let on_select =
        props.on_select.clone();
      html! {
        <div
          key={id}
          class={classes!("item", active.then_some("active"))}
          onclick={move |_| on_select.emit(id)}
        >
          { format!("#{}", category.name) }
        </div>
      }
    })
    .collect::<Html>();

  let header = match &props.info {
    | Some(info) => {
      let links = info
        .links
        .iter()
        .map(|link| {
          html! {
            <a href={link.url.clone()} target="_blank">
              { link.label.clone() }
            </a>
          }
        })
        .collect::<Html>();
      html! {
        <header class="server">
          <h1>{ info.name.clone() }</h1>
          if let Some(address) = &info.address {
            <strong>{ format!("IP: {address}") }</strong>
          }
          <div class="links">{ links }</div>
        </header>
      }
    }
    | None => html! {}
  };

  html! {
    <nav class="sidebar">
      { header }
      <h2>{ "Categorias" }</h2>
      { items }
    </nav>
  }
}
