//! The assignment ledger - which NPC got which role during an event.

use game_world::NpcId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// NPC -> role table that remembers the order NPCs were first assigned in.
///
/// Order matters: role spawns hand out markers first-come-first-served.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentLedger {
    entries: Vec<(NpcId, String)>,
}

impl AssignmentLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a role. Reassigning an NPC keeps its original position.
    ///
    /// Returns the previous role, if any.
    pub fn record(&mut self, npc_id: NpcId, role: impl Into<String>) -> Option<String> {
        let role = role.into();
        match self.entries.iter_mut().find(|(id, _)| *id == npc_id) {
            Some((_, current)) => Some(std::mem::replace(current, role)),
            None => {
                self.entries.push((npc_id, role));
                None
            }
        }
    }

    /// The role given to an NPC.
    pub fn role_of(&self, npc_id: &NpcId) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == npc_id)
            .map(|(_, role)| role.as_str())
    }

    /// How many NPCs hold a role.
    pub fn count_role(&self, role: &str) -> usize {
        self.entries.iter().filter(|(_, r)| r == role).count()
    }

    /// Merge another ledger into this one.
    pub fn merge(&mut self, other: &AssignmentLedger) {
        for (npc_id, role) in other.iter() {
            self.record(npc_id.clone(), role);
        }
    }

    /// Iterate in first-assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&NpcId, &str)> {
        self.entries.iter().map(|(id, role)| (id, role.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Unordered copy, for comparisons and persistence.
    pub fn to_map(&self) -> HashMap<NpcId, String> {
        self.entries.iter().cloned().collect()
    }
}

impl<K: Into<NpcId>, V: Into<String>> FromIterator<(K, V)> for AssignmentLedger {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ledger = AssignmentLedger::new();
        for (npc_id, role) in iter {
            ledger.record(npc_id.into(), role);
        }
        ledger
    }
}
