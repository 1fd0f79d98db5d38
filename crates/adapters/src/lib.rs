//! brandcast adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `connectors`: LinkedIn and Upload-Post publishing connectors
//! - `factory`: platform-to-connector routing
//! - `state`: SQLite and in-memory schedule stores

pub mod connectors;
mod factory;
mod state_memory;
mod state_sqlite;

pub use factory::{FactoryConfig, HttpConnectorFactory, LinkedinConfig, UploadPostConfig};

/// Re-exports for state adapters
pub mod state {
    pub use crate::state_memory::InMemoryScheduleStore;
    pub use crate::state_sqlite::SqliteScheduleStore;
}
