//! Client-side mirror of the other participants, fed by relay messages.

use std::collections::BTreeMap;

use arena_shared::protocol::ServerMsg;
use tracing::warn;

use crate::body::KinematicBody;

/// What the host should do with its ghost entities after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterChange {
    /// Drop every ghost; the whole roster was replaced
    Reset,
    Added(u32),
    Updated(u32),
    Removed(u32),
}

#[derive(Debug, Default)]
pub struct RemoteRoster {
    self_id: Option<u32>,
    players: BTreeMap<u32, KinematicBody>,
}

impl RemoteRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn self_id(&self) -> Option<u32> {
        self.self_id
    }

    pub fn get(&self, id: u32) -> Option<&KinematicBody> {
        self.players.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &KinematicBody)> {
        self.players.iter().map(|(id, body)| (*id, body))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Forget everything, e.g. after the connection dropped.
    pub fn clear(&mut self) {
        self.self_id = None;
        self.players.clear();
    }

    /// Apply one relay message. Entries for our own id are never stored.
    pub fn apply(&mut self, msg: &ServerMsg) -> Vec<RosterChange> {
        match msg {
            ServerMsg::Bootstrap(b) => {
                self.self_id = Some(b.self_id);
                self.players = b
                    .players
                    .iter()
                    .filter(|(id, _)| **id != b.self_id)
                    .map(|(id, state)| (*id, KinematicBody::from(*state)))
                    .collect();
                let mut changes = vec![RosterChange::Reset];
                changes.extend(self.players.keys().map(|id| RosterChange::Added(*id)));
                changes
            }
            ServerMsg::Join(j) => {
                if self.is_self(j.participant_id) {
                    return Vec::new();
                }
                let previous = self
                    .players
                    .insert(j.participant_id, KinematicBody::from(j.state));
                if previous.is_some() {
                    warn!(participant = j.participant_id, "Join for known participant");
                    vec![RosterChange::Updated(j.participant_id)]
                } else {
                    vec![RosterChange::Added(j.participant_id)]
                }
            }
            ServerMsg::State(s) => {
                if self.is_self(s.participant_id) {
                    return Vec::new();
                }
                // A state for an unseen id (its join raced us) creates it.
                match self
                    .players
                    .insert(s.participant_id, KinematicBody::from(s.state))
                {
                    Some(_) => vec![RosterChange::Updated(s.participant_id)],
                    None => vec![RosterChange::Added(s.participant_id)],
                }
            }
            ServerMsg::Leave(l) => match self.players.remove(&l.participant_id) {
                Some(_) => vec![RosterChange::Removed(l.participant_id)],
                None => Vec::new(),
            },
        }
    }

    fn is_self(&self, id: u32) -> bool {
        self.self_id == Some(id)
    }
}
