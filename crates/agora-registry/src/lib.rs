//! Agora Registry - The bounded poll store
//!
//! This crate owns every poll record:
//! - Capacity and name-uniqueness enforcement
//! - Per-poll mutation serialization (no lost updates)
//! - Stable-order snapshots
//! - The record import/export seam for the host's durable store

pub mod registry;

pub use registry::*;
