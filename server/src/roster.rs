use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use arena_shared::protocol::BodyState;

/// Last known state of one connected participant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RosterEntry {
    pub participant_id: u32,
    pub last_state: BodyState,
    /// Unix millis of the last accepted update (or of the join)
    pub last_update: u64,
}

/// Connected participants, owned by the session task.
pub struct Roster {
    entries: BTreeMap<u32, RosterEntry>,
    next_id: u32,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Add a participant with `state`, returns its id. Ids are never reused.
    pub fn add(&mut self, state: BodyState) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(
            id,
            RosterEntry {
                participant_id: id,
                last_state: state,
                last_update: unix_millis(),
            },
        );
        id
    }

    /// Overwrite a participant's state. Returns the stamped entry, or `None`
    /// for an id that is not connected.
    pub fn update(&mut self, id: u32, state: BodyState) -> Option<&RosterEntry> {
        let entry = self.entries.get_mut(&id)?;
        entry.last_state = state;
        entry.last_update = unix_millis();
        Some(entry)
    }

    pub fn remove(&mut self, id: u32) -> Option<RosterEntry> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: u32) -> Option<&RosterEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every participant's last state, keyed by id.
    pub fn states(&self) -> BTreeMap<u32, BodyState> {
        self.entries
            .iter()
            .map(|(id, entry)| (*id, entry.last_state))
            .collect()
    }
}

pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
