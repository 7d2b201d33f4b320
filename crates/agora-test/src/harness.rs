//! Scenario harness - a poll desk on a manual clock
//!
//! Scripts drive the desk through real caller flows while time only
//! moves when the script says so, which makes deadline edges exact.

use std::sync::Arc;
use std::time::{Duration, UNIX_EPOCH};

use agora_core::{Clock, ManualClock, Poll, PollResult, PrincipalId, Timestamp};
use agora_polls::{NewPoll, PollDesk};
use agora_registry::{PollRegistry, RegistryConfig};

/// Instant the harness clock starts at (2024-01-01T00:00:00Z)
pub const SCENARIO_EPOCH: Timestamp = Timestamp(1_704_067_200_000);

/// A poll desk wired to a manual clock
pub struct Scenario {
    pub desk: PollDesk,
    pub clock: Arc<ManualClock>,
}

impl Scenario {
    /// Harness with the default registry bound
    pub fn new() -> Self {
        Scenario::with_capacity_config(RegistryConfig::default())
    }

    /// Harness with an explicit poll capacity
    pub fn with_capacity(max_polls: usize) -> Self {
        Scenario::with_capacity_config(RegistryConfig { max_polls })
    }

    fn with_capacity_config(config: RegistryConfig) -> Self {
        let clock = Arc::new(ManualClock::new(SCENARIO_EPOCH));
        let desk = PollDesk::new(PollRegistry::new(config), clock.clone());
        Scenario { desk, clock }
    }

    /// A distinct principal per script role
    pub fn principal(n: u64) -> PrincipalId {
        PrincipalId::new(n)
    }

    /// Create a poll closing `closes_in` from the clock's current instant
    pub fn open_poll(
        &self,
        name: &str,
        options: &[&str],
        closes_in: Duration,
        owner: PrincipalId,
    ) -> PollResult<Poll> {
        let request = NewPoll {
            name: name.into(),
            description: format!("scenario poll '{name}'"),
            options: options.iter().map(|s| s.to_string()).collect(),
            closes_at: rfc3339(self.clock.now() + closes_in),
        };
        self.desk.create_poll(request, owner)
    }

    /// Move the clock past every deadline created so far plus a margin
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::new()
    }
}

/// Render a ledger timestamp the way callers submit deadlines
/// (seconds precision; scripts keep their durations on whole seconds)
pub fn rfc3339(at: Timestamp) -> String {
    let instant = UNIX_EPOCH + Duration::from_millis(at.as_millis().max(0) as u64);
    humantime::format_rfc3339_seconds(instant).to_string()
}
