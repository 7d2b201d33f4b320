//! Agora Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the Agora poll ledger:
//! - Caller identity (PrincipalId)
//! - Time primitives (Timestamp) and clock sources
//! - Poll, voter and ballot records
//! - The error taxonomy shared by every operation

pub mod id;
pub mod time;
pub mod clock;
pub mod poll;
pub mod error;

pub use id::*;
pub use time::*;
pub use clock::*;
pub use poll::*;
pub use error::*;
