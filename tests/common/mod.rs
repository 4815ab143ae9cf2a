//! Integration test common infrastructure.
//!
//! Provides a recording platform double and a bot harness over an
//! in-memory database.

pub mod harness;
pub mod platform;

#[allow(unused_imports)]
pub use harness::TestBot;
#[allow(unused_imports)]
pub use platform::{Call, RecordingPlatform};
