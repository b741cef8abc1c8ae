use mineboard_client::{
  IdentityStorage,
  StorageError
};

/// Browser `localStorage`; the key comes
/// from the [`IdentityGate`]. Private
/// windows and disabled storage surface
/// as [`StorageError::Unavailable`].
///
/// [`IdentityGate`]: mineboard_client::IdentityGate
#[derive(
  Debug, Clone, Copy, Default,
)]
pub struct LocalIdentityStorage;

fn local_storage()
-> Result<web_sys::Storage, StorageError> {
  web_sys::window()
    .ok_or_else(|| {
      StorageError::Unavailable(
        "no window".to_string()
      )
    })?
    .local_storage()
    .map_err(|err| {
      StorageError::Unavailable(
        format!("{err:?}")
      )
    })?
    .ok_or_else(|| {
      StorageError::Unavailable(
        "localStorage disabled"
          .to_string()
      )
    })
}

impl IdentityStorage
  for LocalIdentityStorage
{
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    local_storage()?
      .get_item(key)
      .map_err(|err| {
        StorageError::Unavailable(
          format!("{err:?}")
        )
      })
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    local_storage()?
      .set_item(key, value)
      .map_err(|err| {
        StorageError::Unavailable(
          format!("{err:?}")
        )
      })
  }
}
