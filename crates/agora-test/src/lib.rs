//! Agora Test Harness - Deterministic lifecycle scenarios
//!
//! This crate provides:
//! - A scenario harness running a poll desk on a manual clock
//! - Named principals for multi-caller scripts
//! - End-to-end suites for the full poll lifecycle

pub mod harness;

pub use harness::*;
