//! The ledger state surface the apply engines run against: a scoped
//! key/value view with staged writes, plus the paged owner directory
//! subsystem.

pub mod directory;
pub mod exceptions;
pub mod view;

pub use directory::{dir_insert, dir_remove};
pub use view::{InMemoryLedger, LedgerView, StagedView};
