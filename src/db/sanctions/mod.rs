//! Repository for time-bound sanctions: bans and warnings.
//!
//! Both tables share one shape and one generic query implementation.
//! A sanction is lifted by moving its expiry to now, never by deleting it.

mod models;
mod queries;

pub use models::{Ban, NewSanction, Sanction, SanctionPatch, Warning};
pub use queries::SanctionRepository;
