//! The poll desk - every caller-facing operation
//!
//! Each operation resolves to a single registry read or a single
//! serialized poll mutation. Validation runs before any field is
//! written, so a failing call commits nothing.

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use agora_core::{
    Ballot, Clock, Poll, PollError, PollResult, PrincipalId, Timestamp, Voter,
};
use agora_registry::PollRegistry;

use crate::tally::result_lines;

/// Creation request for a poll
///
/// The closing deadline arrives as an RFC 3339 string ("2024-05-01
/// 12:00:00" is accepted too) and is parsed against the desk's clock.
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub name: String,
    pub description: String,
    pub options: Vec<String>,
    pub closes_at: String,
}

/// The poll lifecycle service
///
/// Owns the registry and the clock; hosts wire a caller-identity
/// resolver in front of it and pass the resolved principal into every
/// call.
pub struct PollDesk {
    registry: PollRegistry,
    clock: Arc<dyn Clock>,
}

impl PollDesk {
    pub fn new(registry: PollRegistry, clock: Arc<dyn Clock>) -> Self {
        PollDesk { registry, clock }
    }

    /// Access the underlying registry (persistence seam)
    pub fn registry(&self) -> &PollRegistry {
        &self.registry
    }

    /// Create a poll owned by the caller
    pub fn create_poll(&self, request: NewPoll, caller: PrincipalId) -> PollResult<Poll> {
        if self.registry.is_full() {
            return Err(PollError::CapacityExceeded);
        }

        let closes_at = parse_deadline(&request.closes_at)?;
        if closes_at <= self.clock.now() {
            return Err(PollError::DeadlineNotFuture);
        }

        if self.registry.contains(&request.name) {
            return Err(PollError::DuplicateName(request.name));
        }
        if request.options.is_empty() {
            return Err(PollError::NoOptions);
        }

        let poll = Poll::new(
            request.name,
            caller,
            request.description,
            request.options,
            closes_at,
        );
        self.registry.insert(poll.clone())?;
        tracing::debug!("poll '{}' created by {}", poll.name, caller);
        Ok(poll)
    }

    /// Fetch one poll; non-owners receive the redacted projection
    pub fn poll_by_name(&self, name: &str, caller: PrincipalId) -> PollResult<Poll> {
        self.registry
            .read(name, |poll| Ok(poll.clone().visible_to(caller)))
    }

    /// Snapshot of every poll, redacted per poll for non-owners
    pub fn all_polls(&self, caller: PrincipalId) -> Vec<Poll> {
        self.registry
            .snapshot()
            .into_iter()
            .map(|poll| poll.visible_to(caller))
            .collect()
    }

    /// Register the caller on a poll's roster under a display name
    ///
    /// Registration stays open after the poll closes; the deadline gates
    /// voting and results, not the roster.
    pub fn register_voter(
        &self,
        poll_name: &str,
        voter_name: &str,
        caller: PrincipalId,
    ) -> PollResult<Voter> {
        let voter = self.registry.update(poll_name, |poll| {
            if poll.voter_by_name(voter_name).is_some() {
                return Err(PollError::DuplicateVoterName(voter_name.to_string()));
            }
            if poll.voter_by_principal(caller).is_some() {
                return Err(PollError::DuplicateVoterIdentity(caller));
            }
            let voter = Voter::new(voter_name, caller);
            poll.voters.push(voter.clone());
            Ok(voter)
        })?;
        tracing::debug!("voter '{}' registered to poll '{}'", voter.name, poll_name);
        Ok(voter)
    }

    /// Overwrite a voter's contribution weight (owner only)
    ///
    /// The owner can never adjust their own entry, even one they
    /// registered themselves. The new weight is not bounds-checked.
    pub fn change_contribution(
        &self,
        poll_name: &str,
        voter_name: &str,
        contribution: f64,
        caller: PrincipalId,
    ) -> PollResult<Voter> {
        let voter = self.registry.update(poll_name, |poll| {
            if poll.owner != caller {
                return Err(PollError::Unauthorized(poll_name.to_string()));
            }
            let owner = poll.owner;
            let voter = poll
                .voter_by_name_mut(voter_name)
                .ok_or_else(|| PollError::VoterNotFound(voter_name.to_string()))?;
            if voter.principal == owner {
                return Err(PollError::OwnerSelfEdit);
            }
            voter.contribution = contribution;
            Ok(voter.clone())
        })?;
        tracing::debug!(
            "voter '{}' on poll '{}' now weighs {}",
            voter.name,
            poll_name,
            voter.contribution
        );
        Ok(voter)
    }

    /// Cast a vote, capturing the voter's current weight
    pub fn cast_vote(
        &self,
        poll_name: &str,
        voter_name: &str,
        option_label: &str,
        caller: PrincipalId,
    ) -> PollResult<Ballot> {
        let now = self.clock.now();
        let ballot = self.registry.update(poll_name, |poll| {
            if poll.is_closed(now) {
                return Err(PollError::VotingClosed);
            }
            let (principal, contribution) = match poll.voter_by_name(voter_name) {
                Some(voter) => (voter.principal, voter.contribution),
                None => return Err(PollError::VoterNotFound(voter_name.to_string())),
            };
            if principal != caller {
                return Err(PollError::IdentityMismatch);
            }
            let option = poll
                .option_index(option_label)
                .ok_or_else(|| PollError::OptionNotFound(option_label.to_string()))?;

            let ballot = Ballot {
                voter: voter_name.to_string(),
                option,
                contribution,
            };
            poll.ballots.push(ballot.clone());
            Ok(ballot)
        })?;
        tracing::debug!(
            "vote on poll '{}': option {} at weight {}",
            poll_name,
            ballot.option,
            ballot.contribution
        );
        Ok(ballot)
    }

    /// Tally a closed poll into "label: total" lines
    ///
    /// Visible to the owner and registered voters only, and only once
    /// the poll has closed.
    pub fn voting_result(&self, poll_name: &str, caller: PrincipalId) -> PollResult<Vec<String>> {
        let now = self.clock.now();
        self.registry.read(poll_name, |poll| {
            if !poll.is_closed(now) {
                return Err(PollError::NotYetClosed);
            }
            if caller != poll.owner && poll.voter_by_principal(caller).is_none() {
                return Err(PollError::UnauthorizedView(poll_name.to_string()));
            }
            Ok(result_lines(poll))
        })
    }

    /// Remove every poll sufficiently past its deadline
    ///
    /// A poll qualifies once `closes_at + grace <= now`. Returns exactly
    /// the removed polls; running the sweep again right away removes
    /// nothing.
    pub fn remove_expired(&self, grace: Duration) -> Vec<Poll> {
        let now = self.clock.now();
        let removed = self
            .registry
            .drain_where(|poll| poll.closes_at + grace <= now);
        if !removed.is_empty() {
            tracing::info!("expiry sweep removed {} poll(s)", removed.len());
        }
        removed
    }
}

/// Parse an RFC 3339 closing deadline into ledger time
fn parse_deadline(text: &str) -> PollResult<Timestamp> {
    let instant = humantime::parse_rfc3339_weak(text)
        .map_err(|_| PollError::InvalidDate(text.to_string()))?;
    let since_epoch = instant
        .duration_since(UNIX_EPOCH)
        .map_err(|_| PollError::InvalidDate(text.to_string()))?;
    Ok(Timestamp::from_millis(since_epoch.as_millis() as i64))
}
