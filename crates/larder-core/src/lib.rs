//! Larder Core - domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Ingredient`, `Dish`, `Session`
//! - **State machine** - per-record sync phases (pending/synced/failed
//!   crossed with the deletion tombstone)
//! - **Port definitions** - traits for adapters: `IRecordStore`,
//!   `IRemoteService`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no external dependencies.
//! Ports define trait interfaces that adapter crates implement. The sync
//! engine in `larder-sync` orchestrates domain entities through the ports.

pub mod config;
pub mod domain;
pub mod ports;
