//! REST API surface

pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;
