//! API request handlers

mod bookings;
mod engagements;
mod health;
mod payments;
mod postings;
mod proposals;
mod reviews;

pub use bookings::*;
pub use engagements::*;
pub use health::*;
pub use payments::*;
pub use postings::*;
pub use proposals::*;
pub use reviews::*;
