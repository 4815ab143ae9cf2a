//! Channel repository for Chanserv registration.
//!
//! A registered channel row plus the operator, ban and warning sets derived
//! from their own tables at read time.

pub mod models;
pub mod queries;

pub use models::{Channel, NewChannel};
pub use queries::ChannelRepository;
