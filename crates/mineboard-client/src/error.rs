use mineboard_shared::TaskId;
use thiserror::Error;

/// Failure reported by a task store.
/// The board only needs to know that a
/// call failed; the variants exist so
/// logs and the CLI can say why.
#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
pub enum StoreError {
  #[error("task {0} not found")]
  NotFound(TaskId),
  #[error(
    "store rejected request \
     ({status}): {message}"
  )]
  Rejected {
    status:  u16,
    message: String
  },
  #[error("store unavailable: {0}")]
  Unavailable(String),
  #[error(
    "failed decoding store response: \
     {0}"
  )]
  Decode(String)
}

#[derive(
  Debug, Clone, PartialEq, Eq, Error,
)]
pub enum StorageError {
  #[error(
    "identity storage unavailable: {0}"
  )]
  Unavailable(String)
}

/// Why an operation left the board
/// untouched.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Error,
)]
pub enum Declined {
  #[error("no nickname has been set")]
  NoIdentity,
  #[error(
    "another request is still in \
     flight"
  )]
  Busy,
  #[error("nickname cannot be empty")]
  EmptyNickname,
  #[error(
    "nickname could not be saved to \
     identity storage"
  )]
  StorageUnavailable
}
