//! World state management - persistent game state plus the live map.

mod markers;

pub use markers::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{MarkerId, NpcId, NpcRegistry, PartyMember, TilePos};

/// Persistent record kept for an NPC across maps and saves.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NpcRecord {
    /// Narrative role assigned by an event, consulted by static map placement.
    pub role: Option<String>,
    /// `Some(false)` once the NPC has left the world for good.
    pub active: Option<bool>,
    pub map: Option<String>,
    pub tile: Option<TilePos>,
}

/// Everything that survives a save/load cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub current_map_id: String,
    pub player_tile: TilePos,

    /// Story progress flags.
    pub story_flags: HashMap<String, bool>,

    /// Recruited units, in recruitment order.
    pub party: Vec<PartyMember>,

    /// Per-NPC records (roles, whether they are still around...).
    pub npcs: HashMap<NpcId, NpcRecord>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_map_id: "town_01".to_string(),
            player_tile: TilePos::new(5, 5),
            story_flags: HashMap::new(),
            party: Vec::new(),
            npcs: HashMap::new(),
        }
    }
}

impl GameState {
    /// Create a fresh game state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a story flag (unset flags are false).
    pub fn flag(&self, key: &str) -> bool {
        self.story_flags.get(key).copied().unwrap_or(false)
    }

    /// Set a story flag.
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.story_flags.insert(key.into(), value);
    }

    /// Get an NPC's record, if one was ever written.
    pub fn npc(&self, id: &NpcId) -> Option<&NpcRecord> {
        self.npcs.get(id)
    }

    /// Get or create an NPC's record for mutation.
    pub fn npc_mut(&mut self, id: &NpcId) -> &mut NpcRecord {
        self.npcs.entry(id.clone()).or_default()
    }

    /// The role an event assigned to this NPC.
    pub fn npc_role(&self, id: &NpcId) -> Option<&str> {
        self.npcs.get(id).and_then(|r| r.role.as_deref())
    }

    /// Add a unit to the party.
    pub fn add_party_member(&mut self, member: PartyMember) {
        self.party.push(member);
    }

    /// Check whether a unit already marches with the party.
    pub fn has_party_member(&self, id: &str) -> bool {
        self.party.iter().any(|m| m.id == id)
    }
}

/// The running world: persistent state plus the currently loaded map.
///
/// Event scripts only reach this through the engine's world interface; the
/// frame loop owns it and calls [`Overworld::update`] once per frame.
#[derive(Debug, Clone, Default)]
pub struct Overworld {
    pub state: GameState,
    pub markers: MarkerTable,
    pub npcs: NpcRegistry,

    /// While set, player movement input is ignored.
    pub input_locked: bool,

    /// Role assignments made by the running event, mirrored from the engine.
    pub event_assignments: HashMap<NpcId, String>,
}

impl Overworld {
    /// Create a world around existing persistent state.
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    /// Place a marker on the current map.
    pub fn with_marker(mut self, id: impl Into<MarkerId>, tile: TilePos) -> Self {
        self.markers.insert(id, tile);
        self
    }

    /// Spawn a live NPC unit.
    pub fn with_npc(mut self, id: impl Into<NpcId>, tile: TilePos) -> Self {
        self.npcs.spawn(id.into(), tile);
        self
    }

    /// Advance NPC walk tasks by one tile.
    ///
    /// Units that despawn on arrival are marked inactive in the persistent
    /// record so they do not reappear on the next map load.
    pub fn update(&mut self) {
        for id in self.npcs.step_tasks() {
            let record = self.state.npc_mut(&id);
            record.active = Some(false);
            record.map = None;
            record.tile = None;
        }
    }
}
