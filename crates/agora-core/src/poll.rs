//! Poll, voter and ballot records
//!
//! A poll is identified by its name, owns a fixed option list and a
//! closing deadline, and accumulates a voter roster plus an append-only
//! ballot ledger. These records are also the persistence format handed
//! to the host's durable store, hence the serde derives.

use serde::{Deserialize, Serialize};

use crate::{PrincipalId, Timestamp};

/// Weight a newly registered voter starts with
pub const DEFAULT_CONTRIBUTION: f64 = 1.0;

/// Registered participant of one poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voter {
    /// Display name, unique within the poll
    pub name: String,
    /// Identity principal, unique within the poll
    #[serde(rename = "identity")]
    pub principal: PrincipalId,
    /// Weight applied to this voter's ballots at cast time
    pub contribution: f64,
}

impl Voter {
    pub fn new(name: impl Into<String>, principal: PrincipalId) -> Self {
        Voter {
            name: name.into(),
            principal,
            contribution: DEFAULT_CONTRIBUTION,
        }
    }
}

/// One cast vote - append-only, never rewritten
///
/// The contribution is a snapshot taken when the ballot is cast; later
/// roster edits do not reach back into the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    /// Display name of the voter who cast it
    #[serde(rename = "name")]
    pub voter: String,
    /// Index into the poll's option list
    #[serde(rename = "optionIndex")]
    pub option: usize,
    /// Contribution weight at cast time
    pub contribution: f64,
}

/// A named vote with fixed options and a closing deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    /// Primary key, unique across the registry, immutable
    pub name: String,
    /// Creator; the only identity allowed to see the roster and ledger
    pub owner: PrincipalId,
    pub description: String,
    /// Option labels, non-empty, fixed at creation
    pub options: Vec<String>,
    /// Instant at which voting closes and results open
    #[serde(rename = "closingDeadline")]
    pub closes_at: Timestamp,
    pub voters: Vec<Voter>,
    #[serde(rename = "votingDetails")]
    pub ballots: Vec<Ballot>,
}

impl Poll {
    pub fn new(
        name: impl Into<String>,
        owner: PrincipalId,
        description: impl Into<String>,
        options: Vec<String>,
        closes_at: Timestamp,
    ) -> Self {
        Poll {
            name: name.into(),
            owner,
            description: description.into(),
            options,
            closes_at,
            voters: Vec::new(),
            ballots: Vec::new(),
        }
    }

    /// Whether voting has closed at `now`
    /// INVARIANT: the deadline instant itself counts as closed
    #[inline]
    pub fn is_closed(&self, now: Timestamp) -> bool {
        now >= self.closes_at
    }

    /// Find a roster entry by display name
    pub fn voter_by_name(&self, name: &str) -> Option<&Voter> {
        self.voters.iter().find(|v| v.name == name)
    }

    /// Find a roster entry by display name, mutably
    pub fn voter_by_name_mut(&mut self, name: &str) -> Option<&mut Voter> {
        self.voters.iter_mut().find(|v| v.name == name)
    }

    /// Find a roster entry by identity principal
    pub fn voter_by_principal(&self, principal: PrincipalId) -> Option<&Voter> {
        self.voters.iter().find(|v| v.principal == principal)
    }

    /// Position of an option label in the fixed option list
    pub fn option_index(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|o| o == label)
    }

    /// Read-time projection: non-owners never see the roster or ledger
    pub fn visible_to(mut self, caller: PrincipalId) -> Poll {
        if self.owner != caller {
            self.voters.clear();
            self.ballots.clear();
        }
        self
    }
}
