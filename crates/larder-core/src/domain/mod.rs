//! Domain entities and value types
//!
//! Pure business logic with no I/O dependencies. The entities here model
//! the offline-first lifecycle: every record is usable the moment it is
//! created locally, and carries the bookkeeping (`SyncStatus`, tombstone
//! flag, dual identity) the sync engine needs to reconcile it with the
//! remote service later.

pub mod dish;
pub mod errors;
pub mod ingredient;
pub mod newtypes;
pub mod session;

pub use dish::{Dish, DishIngredient};
pub use errors::DomainError;
pub use ingredient::{Ingredient, RecordPhase, StorageType, SyncStatus};
pub use newtypes::{FamilyId, LocalId, ServerId};
pub use session::Session;
