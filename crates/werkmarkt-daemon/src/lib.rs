//! Werkmarkt Daemon library
//!
//! Core components of the werkmarkt daemon:
//! - REST API handlers
//! - Storage backends (traits + in-memory coordination layer)
//! - Server lifecycle management

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod storage;

pub use config::DaemonConfig;
pub use error::{ApiError, DaemonError, StorageError};
pub use server::Server;
pub use storage::{InMemoryStorage, Storage};
