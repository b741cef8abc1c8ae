use serde::{
  Deserialize,
  Serialize
};

pub type TaskId = i64;
pub type CategoryId = i64;

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
pub struct Category {
  pub id:   CategoryId,
  pub name: String
}

/// A member helping on a task. The
/// nickname is the whole identity.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Hash,
)]
pub struct Player {
  pub name: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id:         TaskId,
  #[serde(default)]
  pub title:      String,
  #[serde(default)]
  pub completed:  bool,
  pub created_by: String,
  #[serde(default)]
  pub categories: Vec<Category>,
  #[serde(default)]
  pub players:    Vec<Player>
}

impl Task {
  pub fn has_category(
    &self,
    category_id: CategoryId
  ) -> bool {
    self
      .categories
      .iter()
      .any(|category| {
        category.id == category_id
      })
  }

  pub fn has_player(
    &self,
    nickname: &str
  ) -> bool {
    self
      .players
      .iter()
      .any(|player| {
        player.name == nickname
      })
  }
}

/// What the create-task dialog hands
/// back. The author is attached by the
/// board, never by the form.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub struct NewTaskDraft {
  pub title:      String,
  #[serde(default)]
  pub categories: Vec<CategoryId>
}

impl NewTaskDraft {
  pub fn with_author(
    self,
    created_by: impl Into<String>
  ) -> NewTask {
    NewTask {
      title:      self.title,
      categories: self.categories,
      created_by: created_by.into()
    }
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
  pub title:      String,
  #[serde(default)]
  pub categories: Vec<CategoryId>,
  pub created_by: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ToggleAssignmentArgs {
  pub nickname: String
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct ApiErrorBody {
  pub error: String
}

/// Sidebar header: the server's name,
/// its join address and community links.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ServerInfo {
  pub name:    String,
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub links:   Vec<ServerLink>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ServerLink {
  pub label: String,
  pub url:   String
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn task_wire_format_is_camel_case() {
    let raw = r#"{
      "id": 5,
      "title": "Build wall",
      "completed": false,
      "createdBy": "Steve",
      "categories": [{"id": 1, "name": "Construção"}],
      "players": [{"name": "Alex"}]
    }"#;

    let task: Task =
      serde_json::from_str(raw)
        .expect("decode task");
    assert_eq!(task.created_by, "Steve");
    assert!(task.has_category(1));
    assert!(!task.has_category(2));
    assert!(task.has_player("Alex"));
    assert!(!task.has_player("Steve"));

    let encoded =
      serde_json::to_value(&task)
        .expect("encode task");
    assert_eq!(
      encoded["createdBy"],
      "Steve"
    );
  }

  #[test]
  fn missing_collections_default_to_empty() {
    let raw = r#"{"id": 1, "createdBy": "Steve"}"#;
    let task: Task =
      serde_json::from_str(raw)
        .expect("decode task");
    assert!(task.categories.is_empty());
    assert!(task.players.is_empty());
    assert!(!task.completed);
  }

  #[test]
  fn draft_gains_author() {
    let draft = NewTaskDraft {
      title:      "Farm".to_string(),
      categories: vec![3]
    };
    let task = draft.with_author("Steve");
    assert_eq!(task.created_by, "Steve");
    assert_eq!(task.categories, vec![3]);
  }
}
