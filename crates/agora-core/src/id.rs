//! Identity types for the Agora poll ledger
//!
//! Principals are opaque 64-bit values handed to the core by the host's
//! identity resolver. The core only ever compares them for equality; it
//! never inspects or parses them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller identity - stable principal resolved by the host for each request
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PrincipalId(pub u64);

impl PrincipalId {
    pub const ANONYMOUS: PrincipalId = PrincipalId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        PrincipalId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        PrincipalId(u64::from_le_bytes(bytes))
    }
}

impl fmt::Debug for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({:016x})", self.0)
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
