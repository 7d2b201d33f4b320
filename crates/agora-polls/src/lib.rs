//! Agora Polls - The poll lifecycle call surface
//!
//! This crate implements the operations a host exposes to callers:
//! - Poll creation with deadline validation
//! - Owner-gated visibility of rosters and ledgers
//! - Voter registration and contribution management
//! - Weighted vote casting and post-close tallying
//! - Expiry sweeps

pub mod desk;
pub mod tally;

pub use desk::*;
pub use tally::*;
