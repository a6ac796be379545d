//! Port traits (hexagonal architecture boundaries)
//!
//! Driven ports implemented by adapter crates: the record store by
//! `larder-store`, the remote service by `larder-api`.

pub mod record_store;
pub mod remote_service;

pub use record_store::IRecordStore;
pub use remote_service::{
    IAuthService, IRemoteService, RemoteDish, RemoteError, RemoteIngredient,
};
