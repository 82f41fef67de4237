//! Storage layer for werkmarkt-daemon
//!
//! Postgres lives behind the same traits in production; the daemon ships
//! the in-memory backend for development and tests.

mod memory;
mod traits;

pub use memory::InMemoryStorage;
pub use traits::{
    BookingStorage, EngagementStorage, PaymentStorage, PostingStorage, ProposalStorage,
    ReviewStorage, Storage,
};
