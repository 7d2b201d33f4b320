//! Bounded poll registry with per-poll mutation serialization

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use agora_core::{Poll, PollError, PollResult};

/// Registry capacity used when none is configured
pub const DEFAULT_MAX_POLLS: usize = 3;

/// Registry configuration
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Maximum number of polls held at once
    pub max_polls: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// One stored poll behind its own mutation lock
#[derive(Debug)]
struct PollCell {
    /// Key copy, readable without touching the cell lock
    name: String,
    slot: Arc<Mutex<Poll>>,
}

/// Bounded mapping from poll name to poll record
///
/// The cell list sits behind a RwLock; each poll sits behind its own
/// mutex. Mutators hold the list read guard for the whole cell mutation,
/// so structural changes (insert, remove, sweep) take the write guard and
/// can never run while a cell mutation is in flight. Operations on
/// different poll names proceed in parallel.
///
/// INVARIANT: at most one in-flight mutation per poll name.
/// INVARIANT: cell order is insertion order; snapshots are stable.
#[derive(Debug)]
pub struct PollRegistry {
    config: RegistryConfig,
    cells: RwLock<Vec<PollCell>>,
}

impl PollRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        PollRegistry {
            config,
            cells: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored polls
    pub fn len(&self) -> usize {
        self.cells.read().len()
    }

    /// Check if the registry holds no polls
    pub fn is_empty(&self) -> bool {
        self.cells.read().is_empty()
    }

    /// Check if the registry is at capacity
    pub fn is_full(&self) -> bool {
        self.cells.read().len() >= self.config.max_polls
    }

    /// Check if a poll name is taken
    pub fn contains(&self, name: &str) -> bool {
        self.cells.read().iter().any(|c| c.name == name)
    }

    /// Store a new poll
    ///
    /// Fails with `DuplicateName` if the name is taken, and with
    /// `CapacityExceeded` if the registry is full and the name is new.
    /// The check and the insert happen under one write guard.
    pub fn insert(&self, poll: Poll) -> PollResult<()> {
        let mut cells = self.cells.write();

        if cells.iter().any(|c| c.name == poll.name) {
            return Err(PollError::DuplicateName(poll.name));
        }
        if cells.len() >= self.config.max_polls {
            return Err(PollError::CapacityExceeded);
        }

        tracing::debug!("poll '{}' stored", poll.name);
        cells.push(PollCell {
            name: poll.name.clone(),
            slot: Arc::new(Mutex::new(poll)),
        });
        Ok(())
    }

    /// Run a read-only computation over one poll
    pub fn read<T>(&self, name: &str, f: impl FnOnce(&Poll) -> PollResult<T>) -> PollResult<T> {
        let cells = self.cells.read();
        let cell = cells
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PollError::NotFound(name.to_string()))?;
        let poll = cell.slot.lock();
        f(&poll)
    }

    /// Run a validating mutation over one poll
    ///
    /// An Err return restores the record to its prior state, so a failing
    /// operation commits nothing. This is the single mutation path, so two
    /// racing updates on the same name serialize on the cell lock.
    pub fn update<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Poll) -> PollResult<T>,
    ) -> PollResult<T> {
        let cells = self.cells.read();
        let cell = cells
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PollError::NotFound(name.to_string()))?;
        let mut poll = cell.slot.lock();
        let before = poll.clone();
        match f(&mut poll) {
            Ok(value) => Ok(value),
            Err(err) => {
                *poll = before;
                Err(err)
            }
        }
    }

    /// Remove a poll, returning it if it was present
    pub fn remove(&self, name: &str) -> Option<Poll> {
        let mut cells = self.cells.write();
        let index = cells.iter().position(|c| c.name == name)?;
        let cell = cells.remove(index);
        tracing::debug!("poll '{}' removed", cell.name);
        Some(unwrap_cell(cell))
    }

    /// Remove and return every poll matching the predicate
    ///
    /// One write guard covers the whole sweep, so it cannot interleave
    /// with inserts or cell mutations.
    pub fn drain_where(&self, pred: impl Fn(&Poll) -> bool) -> Vec<Poll> {
        let mut cells = self.cells.write();
        let mut removed = Vec::new();
        let mut index = 0;
        while index < cells.len() {
            let expired = pred(&cells[index].slot.lock());
            if expired {
                removed.push(unwrap_cell(cells.remove(index)));
            } else {
                index += 1;
            }
        }
        removed
    }

    /// Cloned view of every poll, in insertion order
    pub fn snapshot(&self) -> Vec<Poll> {
        self.cells
            .read()
            .iter()
            .map(|c| c.slot.lock().clone())
            .collect()
    }

    /// Export the stored records for the host's durable store
    pub fn records(&self) -> Vec<Poll> {
        self.snapshot()
    }

    /// Load records exported earlier, respecting capacity and uniqueness
    pub fn restore(&self, records: Vec<Poll>) -> PollResult<()> {
        for record in records {
            self.insert(record)?;
        }
        Ok(())
    }
}

impl Default for PollRegistry {
    fn default() -> Self {
        PollRegistry::new(RegistryConfig::default())
    }
}

/// Take the poll out of a detached cell
///
/// Holders of the cell's Arc also hold the list read guard, and cells are
/// only detached under the write guard, so the Arc is unique here; the
/// clone path is a fallback, not a code path we expect to take.
fn unwrap_cell(cell: PollCell) -> Poll {
    match Arc::try_unwrap(cell.slot) {
        Ok(mutex) => mutex.into_inner(),
        Err(shared) => shared.lock().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::{PrincipalId, Timestamp};

    fn poll(name: &str) -> Poll {
        Poll::new(
            name,
            PrincipalId::new(1),
            "",
            vec!["yes".into(), "no".into()],
            Timestamp::from_secs(1000),
        )
    }

    #[test]
    fn test_insert_and_lookup() {
        let registry = PollRegistry::default();
        registry.insert(poll("a")).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));

        let name = registry.read("a", |p| Ok(p.name.clone())).unwrap();
        assert_eq!(name, "a");
    }

    #[test]
    fn test_missing_poll_is_not_found() {
        let registry = PollRegistry::default();
        let err = registry.read("ghost", |_| Ok(())).unwrap_err();
        assert_eq!(err, PollError::NotFound("ghost".into()));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = PollRegistry::default();
        registry.insert(poll("a")).unwrap();
        let err = registry.insert(poll("a")).unwrap_err();
        assert_eq!(err, PollError::DuplicateName("a".into()));
    }

    #[test]
    fn test_capacity_bound() {
        let registry = PollRegistry::new(RegistryConfig { max_polls: 2 });
        registry.insert(poll("a")).unwrap();
        registry.insert(poll("b")).unwrap();

        let err = registry.insert(poll("c")).unwrap_err();
        assert_eq!(err, PollError::CapacityExceeded);

        // Removal frees a slot again
        registry.remove("a");
        registry.insert(poll("c")).unwrap();
    }

    #[test]
    fn test_duplicate_wins_over_capacity_at_the_bound() {
        let registry = PollRegistry::new(RegistryConfig { max_polls: 1 });
        registry.insert(poll("a")).unwrap();
        let err = registry.insert(poll("a")).unwrap_err();
        assert_eq!(err, PollError::DuplicateName("a".into()));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = PollRegistry::default();
        registry.insert(poll("a")).unwrap();

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
    }

    #[test]
    fn test_failed_update_commits_nothing() {
        let registry = PollRegistry::default();
        registry.insert(poll("a")).unwrap();

        let res: PollResult<()> = registry.update("a", |p| {
            p.description = "half-written".into();
            Err(PollError::VotingClosed)
        });
        assert!(res.is_err());

        let description = registry.read("a", |p| Ok(p.description.clone())).unwrap();
        assert_eq!(description, "");
    }

    #[test]
    fn test_snapshot_keeps_insertion_order() {
        let registry = PollRegistry::default();
        registry.insert(poll("first")).unwrap();
        registry.insert(poll("second")).unwrap();
        registry.insert(poll("third")).unwrap();

        let names: Vec<_> = registry.snapshot().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);

        // Removing from the middle keeps the remaining order
        registry.remove("second");
        let names: Vec<_> = registry.snapshot().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["first", "third"]);
    }

    #[test]
    fn test_drain_where_takes_exactly_the_matching_polls() {
        let registry = PollRegistry::default();
        registry.insert(poll("keep")).unwrap();
        registry.insert(poll("drop-1")).unwrap();
        registry.insert(poll("drop-2")).unwrap();

        let removed = registry.drain_where(|p| p.name.starts_with("drop"));
        let mut names: Vec<_> = removed.into_iter().map(|p| p.name).collect();
        names.sort();
        assert_eq!(names, vec!["drop-1", "drop-2"]);
        assert_eq!(registry.len(), 1);

        assert!(registry.drain_where(|p| p.name.starts_with("drop")).is_empty());
    }

    #[test]
    fn test_restore_roundtrips_records() {
        let registry = PollRegistry::default();
        registry.insert(poll("a")).unwrap();
        registry.insert(poll("b")).unwrap();

        let records = registry.records();
        let rebuilt = PollRegistry::default();
        rebuilt.restore(records.clone()).unwrap();
        assert_eq!(rebuilt.records(), records);
    }

    #[test]
    fn test_parallel_updates_on_one_poll_never_lose_writes() {
        let registry = Arc::new(PollRegistry::default());
        registry.insert(poll("hot")).unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                for _ in 0..250 {
                    registry
                        .update("hot", |p| {
                            p.ballots.push(agora_core::Ballot {
                                voter: "x".into(),
                                option: 0,
                                contribution: 1.0,
                            });
                            Ok(())
                        })
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let total = registry.read("hot", |p| Ok(p.ballots.len())).unwrap();
        assert_eq!(total, 1000);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Interleavings of inserts and removes never push the registry
            // past its configured bound.
            #[test]
            fn prop_len_never_exceeds_capacity(
                ops in proptest::collection::vec((0usize..8, any::<bool>()), 0..64),
            ) {
                let registry = PollRegistry::new(RegistryConfig { max_polls: 3 });
                for (slot, is_insert) in ops {
                    let name = format!("poll-{slot}");
                    if is_insert {
                        let _ = registry.insert(poll(&name));
                    } else {
                        registry.remove(&name);
                    }
                    prop_assert!(registry.len() <= 3);
                }
            }
        }
    }
}
