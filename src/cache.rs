//! Short-lived store of the latest observation per agent.
//!
//! Holds at most one [`ObservationSnapshot`] per [`EntityId`]. Snapshots are
//! replaced, never edited. Entries older than the TTL or whose agent has
//! died are dropped by [`ObservationCache::sweep`], which callers run before
//! every [`ObservationCache::aggregate`].
use hashbrown::HashMap;

use crate::constants::SNAPSHOT_TTL;
use crate::entity::EntityId;
use crate::perception::ObservationSnapshot;

/// The agent an aggregate state refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub agent: EntityId,
    pub name: String,
    pub distance: f32,
}

impl Reference {
    fn of(snapshot: &ObservationSnapshot) -> Self {
        Self {
            agent: snapshot.agent,
            name: snapshot.agent_name.clone(),
            distance: snapshot.distance,
        }
    }
}

/// Summary of every live snapshot, produced in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheAggregate {
    pub seen_any: bool,
    pub nearest_seen: Option<Reference>,
    pub hidden_any: bool,
    pub nearest_hidden: Option<Reference>,
    /// Number of snapshots considered.
    pub evaluated: usize,
}

#[derive(Debug, Clone)]
pub struct ObservationCache {
    entries: HashMap<EntityId, ObservationSnapshot>,
    ttl: f64,
}

impl Default for ObservationCache {
    fn default() -> Self {
        Self::with_ttl(SNAPSHOT_TTL)
    }
}

impl ObservationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ttl(ttl: f64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Inserts `snapshot`, replacing any previous one for the same agent.
    pub fn upsert(&mut self, snapshot: ObservationSnapshot) {
        self.entries.insert(snapshot.agent, snapshot);
    }

    /// Drops expired snapshots and those whose agent `is_alive` rejects.
    /// Returns the number removed.
    pub fn sweep(&mut self, now: f64, mut is_alive: impl FnMut(EntityId) -> bool) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries
            .retain(|id, snapshot| now - snapshot.timestamp <= ttl && is_alive(*id));
        before - self.entries.len()
    }

    /// Folds the current entries into a [`CacheAggregate`].
    ///
    /// Ties on distance keep whichever entry the pass met first.
    #[must_use]
    pub fn aggregate(&self) -> CacheAggregate {
        let mut nearest_seen: Option<&ObservationSnapshot> = None;
        let mut nearest_hidden: Option<&ObservationSnapshot> = None;
        for snapshot in self.entries.values() {
            let slot = if snapshot.seen {
                &mut nearest_seen
            } else if snapshot.hidden_candidate {
                &mut nearest_hidden
            } else {
                continue;
            };
            if slot.is_none_or(|best| snapshot.distance < best.distance) {
                *slot = Some(snapshot);
            }
        }
        CacheAggregate {
            seen_any: nearest_seen.is_some(),
            nearest_seen: nearest_seen.map(Reference::of),
            hidden_any: nearest_hidden.is_some(),
            nearest_hidden: nearest_hidden.map(Reference::of),
            evaluated: self.entries.len(),
        }
    }

    pub fn get(&self, agent: EntityId) -> Option<&ObservationSnapshot> {
        self.entries.get(&agent)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
