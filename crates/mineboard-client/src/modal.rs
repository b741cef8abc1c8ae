use tracing::debug;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Dialog {
  Identity,
  CreateTask
}

/// Open flags for the two dialogs.
///
/// The flags are independent; callers
/// keep them exclusive by flow. When both
/// happen to be set the identity dialog
/// wins in [`Modals::visible`].
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub struct Modals {
  identity_open:    bool,
  create_task_open: bool
}

impl Modals {
  pub fn is_open(
    &self,
    dialog: Dialog
  ) -> bool {
    match dialog {
      | Dialog::Identity => {
        self.identity_open
      }
      | Dialog::CreateTask => {
        self.create_task_open
      }
    }
  }

  pub fn is_identity_open(&self) -> bool {
    self.identity_open
  }

  pub fn is_create_task_open(
    &self
  ) -> bool {
    self.create_task_open
  }

  pub fn visible(
    &self
  ) -> Option<Dialog> {
    if self.identity_open {
      Some(Dialog::Identity)
    } else if self.create_task_open {
      Some(Dialog::CreateTask)
    } else {
      None
    }
  }

  /// Startup: the identity dialog is the
  /// only dialog open by default, and
  /// only when no nickname was found.
  pub(crate) fn identity_resolved(
    &mut self,
    present: bool
  ) {
    self.identity_open = !present;
    self.create_task_open = false;
    debug!(
      identity_open = self.identity_open,
      "identity resolved"
    );
  }

  pub(crate) fn identity_accepted(
    &mut self
  ) {
    self.identity_open = false;
  }

  pub(crate) fn open_create_task(
    &mut self
  ) -> bool {
    let changed = !self.create_task_open;
    self.create_task_open = true;
    changed
  }

  pub(crate) fn close_create_task(
    &mut self
  ) -> bool {
    let changed = self.create_task_open;
    self.create_task_open = false;
    changed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn absent_identity_opens_only_identity_dialog()
  {
    let mut modals = Modals::default();
    modals.open_create_task();
    modals.identity_resolved(false);

    assert!(modals.is_identity_open());
    assert!(!modals.is_create_task_open());
    assert_eq!(
      modals.visible(),
      Some(Dialog::Identity)
    );
  }

  #[test]
  fn identity_dialog_takes_precedence() {
    let mut modals = Modals::default();
    modals.identity_resolved(false);
    modals.open_create_task();

    assert!(
      modals.is_open(Dialog::CreateTask)
    );
    assert_eq!(
      modals.visible(),
      Some(Dialog::Identity)
    );

    modals.identity_accepted();
    assert_eq!(
      modals.visible(),
      Some(Dialog::CreateTask)
    );
  }

  #[test]
  fn create_task_open_close_report_changes()
  {
    let mut modals = Modals::default();
    assert!(modals.open_create_task());
    assert!(!modals.open_create_task());
    assert!(modals.close_create_task());
    assert!(!modals.close_create_task());
    assert_eq!(modals.visible(), None);
  }
}
