//! Finova Store - Entities and Data Access
//!
//! TigerStyle: every table is reached through a narrow trait, one per
//! entity, with a simulation backend for tests and a Postgres backend for
//! production.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Finova Store                   │
//! ├─────────────────────────────────────────────┤
//! │  UserStore        │ accounts, balances       │
//! │  GadgetStore      │ store catalog            │
//! │  StatementStore   │ bank transactions        │
//! ├─────────────────────────────────────────────┤
//! │  SimStorageBackend  │ in-memory (tests/dev)  │
//! │  PostgresBackend    │ sqlx pool (prod)       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use finova_store::{GadgetStore, NewGadget, SimStorageBackend};
//!
//! # tokio_test::block_on(async {
//! let backend = SimStorageBackend::new();
//! let gadget = backend
//!     .insert_gadget(&NewGadget::new("Pocket Drone", "Folds flat", "https://img/drone.png", 99.0))
//!     .await
//!     .unwrap();
//! assert_eq!(backend.get_gadget(gadget.id).await.unwrap().unwrap().name, "Pocket Drone");
//! # });
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod seed;
pub mod storage;

// Re-export common types
pub use constants::*;
pub use storage::{
    Gadget, GadgetStore, NewGadget, NewStatement, NewUser, SimStorageBackend, Statement,
    StatementStore, StorageError, StorageResult, TransactionType, User, UserStore,
};

#[cfg(feature = "postgres")]
pub use storage::{PostgresBackend, PostgresConfig};
