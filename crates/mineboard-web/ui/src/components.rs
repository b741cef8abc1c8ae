mod create_task_modal;
mod identity_modal;
mod loader;
mod sidebar;
mod task_card;

pub use create_task_modal::CreateTaskModal;
pub use identity_modal::IdentityModal;
pub use loader::Loader;
pub use sidebar::CategorySidebar;
pub use task_card::{
  TaskCard,
  helm_avatar_url
};
