use std::collections::HashMap;

use tracing::{
  debug,
  info,
  warn
};

use crate::error::{
  Declined,
  StorageError
};

pub const DEFAULT_IDENTITY_KEY: &str =
  "MINECRAFT_NICKNAME";

/// Durable key-value surface holding
/// the nickname between sessions.
pub trait IdentityStorage {
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>;

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError>;
}

impl<T> IdentityStorage for Box<T>
where
  T: IdentityStorage + ?Sized
{
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    (**self).get(key)
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    (**self).set(key, value)
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStorage {
  values:      HashMap<String, String>,
  unavailable: bool
}

impl MemoryIdentityStorage {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_value(
    key: &str,
    value: &str
  ) -> Self {
    let mut values = HashMap::new();
    values.insert(
      key.to_string(),
      value.to_string()
    );
    Self {
      values,
      unavailable: false
    }
  }

  /// Storage that fails every read
  /// and write.
  pub fn unavailable() -> Self {
    Self {
      values:      HashMap::new(),
      unavailable: true
    }
  }

  pub fn value(
    &self,
    key: &str
  ) -> Option<&str> {
    self
      .values
      .get(key)
      .map(String::as_str)
  }
}

impl IdentityStorage
  for MemoryIdentityStorage
{
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StorageError>
  {
    if self.unavailable {
      return Err(
        StorageError::Unavailable(
          "memory storage disabled"
            .to_string()
        )
      );
    }
    Ok(self.values.get(key).cloned())
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StorageError> {
    if self.unavailable {
      return Err(
        StorageError::Unavailable(
          "memory storage disabled"
            .to_string()
        )
      );
    }
    self.values.insert(
      key.to_string(),
      value.to_string()
    );
    Ok(())
  }
}

/// Reads and writes the nickname under
/// a single storage key.
#[derive(Debug, Clone)]
pub struct IdentityGate<S> {
  storage: S,
  key:     String
}

impl<S: IdentityStorage> IdentityGate<S> {
  pub fn new(storage: S) -> Self {
    Self::with_key(
      storage,
      DEFAULT_IDENTITY_KEY
    )
  }

  pub fn with_key(
    storage: S,
    key: impl Into<String>
  ) -> Self {
    Self {
      storage,
      key: key.into()
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Storage failures and blank values
  /// both come back as `None`, which
  /// sends the user to the nickname
  /// dialog.
  #[tracing::instrument(skip(self), fields(key = %self.key))]
  pub fn resolve(
    &self
  ) -> Option<String> {
    match self.storage.get(&self.key) {
      | Ok(Some(raw)) => {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
          debug!(
            "stored nickname is blank"
          );
          None
        } else {
          debug!(nickname = %trimmed, "resolved stored nickname");
          Some(trimmed.to_string())
        }
      }
      | Ok(None) => {
        debug!("no stored nickname");
        None
      }
      | Err(error) => {
        warn!(%error, "identity storage read failed; treating as absent");
        None
      }
    }
  }

  /// Persists `nickname` and returns
  /// the value that was stored.
  #[tracing::instrument(skip(self), fields(key = %self.key))]
  pub fn submit(
    &mut self,
    nickname: &str
  ) -> Result<String, Declined> {
    let nickname = nickname.trim();
    if nickname.is_empty() {
      return Err(Declined::EmptyNickname);
    }

    if let Err(error) =
      self.storage.set(&self.key, nickname)
    {
      warn!(%error, "identity storage write failed");
      return Err(
        Declined::StorageUnavailable
      );
    }

    info!(nickname, "stored nickname");
    Ok(nickname.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolve_reads_stored_nickname() {
    let gate = IdentityGate::new(
      MemoryIdentityStorage::with_value(
        DEFAULT_IDENTITY_KEY,
        "  Steve "
      )
    );
    assert_eq!(
      gate.resolve().as_deref(),
      Some("Steve")
    );
  }

  #[test]
  fn resolve_treats_blank_and_failure_as_absent()
  {
    let blank = IdentityGate::new(
      MemoryIdentityStorage::with_value(
        DEFAULT_IDENTITY_KEY,
        "   "
      )
    );
    assert_eq!(blank.resolve(), None);

    let broken = IdentityGate::new(
      MemoryIdentityStorage::unavailable()
    );
    assert_eq!(broken.resolve(), None);
  }

  #[test]
  fn submit_persists_under_configured_key()
  {
    let mut gate = IdentityGate::with_key(
      MemoryIdentityStorage::new(),
      "nick"
    );
    let stored = gate
      .submit(" Alex ")
      .expect("submit nickname");
    assert_eq!(stored, "Alex");
    assert_eq!(
      gate.storage().value("nick"),
      Some("Alex")
    );
    assert_eq!(
      gate
        .storage()
        .value(DEFAULT_IDENTITY_KEY),
      None
    );
  }

  #[test]
  fn submit_declines_empty_and_unwritable()
  {
    let mut gate = IdentityGate::new(
      MemoryIdentityStorage::new()
    );
    assert_eq!(
      gate.submit("  "),
      Err(Declined::EmptyNickname)
    );

    let mut broken = IdentityGate::new(
      MemoryIdentityStorage::unavailable()
    );
    assert_eq!(
      broken.submit("Steve"),
      Err(Declined::StorageUnavailable)
    );
  }
}
