//! Client-side state machine for the
//! Mineboard task board.
//!
//! [`Board`] owns everything the
//! presentation layer reads: the last
//! fetched task list, the category
//! filter, the nickname, the loading
//! flag and the two dialog flags. It
//! never talks to the network itself;
//! every operation that needs the task
//! store leaves an [`InFlight`] call
//! behind, which a driver executes and
//! feeds back through
//! [`Board::settle`]. [`TaskBoard`] is
//! that driver for callers that can
//! simply `.await`.

pub mod board;
pub mod driver;
pub mod error;
pub mod identity;
pub mod modal;
pub mod store;
pub mod view;

pub use board::{
  Board,
  CallOutcome,
  InFlight,
  RemoteCall,
  Settlement,
  Ticket
};
pub use driver::{
  Settled,
  TaskBoard,
  execute
};
pub use error::{
  Declined,
  StorageError,
  StoreError
};
pub use identity::{
  DEFAULT_IDENTITY_KEY,
  IdentityGate,
  IdentityStorage,
  MemoryIdentityStorage
};
pub use mineboard_shared::{
  Category,
  CategoryId,
  NewTask,
  NewTaskDraft,
  Player,
  Task,
  TaskId
};
pub use modal::{
  Dialog,
  Modals
};
pub use store::{
  MemoryTaskStore,
  StoreCall,
  TaskStore
};
pub use view::{
  BoardView,
  EmptyState
};
