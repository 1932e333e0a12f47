//! The world boundary: everything the engine needs from the running game.

use game_world::{MarkerId, NpcId, Overworld, PartyMember, TilePos};

/// World mutation and lookup primitives the engine relies on.
///
/// The host game implements this (or uses [`Overworld`]) and routes player
/// interaction into the interpreter's public entry points.
pub trait World {
    /// Read a persistent story flag.
    fn flag(&self, name: &str) -> bool;

    /// Write a persistent story flag.
    fn set_flag(&mut self, name: &str, value: bool);

    /// Whether player movement input is ignored.
    fn input_locked(&self) -> bool;

    /// Lock or release player movement.
    fn set_input_locked(&mut self, locked: bool);

    /// Tile of a marker on the current map.
    fn marker(&self, id: &MarkerId) -> Option<TilePos>;

    /// Whether the NPC has a live unit on the current map.
    fn has_npc_unit(&self, id: &NpcId) -> bool;

    /// Teleport a live unit. Returns false when there is no such unit.
    fn relocate_npc(&mut self, id: &NpcId, tile: TilePos) -> bool;

    /// Send a live unit walking. Returns false when there is no such unit.
    fn walk_npc_to(&mut self, id: &NpcId, target: TilePos, despawn_on_arrival: bool) -> bool;

    /// Take a live unit off the map.
    fn remove_npc(&mut self, id: &NpcId);

    fn has_party_member(&self, id: &str) -> bool;

    fn add_party_member(&mut self, member: PartyMember);

    /// Persist the NPC's narrative role.
    fn set_npc_role(&mut self, id: &NpcId, role: &str);

    /// Mirror an assignment into the world's per-event assignment store.
    fn record_event_assignment(&mut self, id: &NpcId, role: &str);
}

impl World for Overworld {
    fn flag(&self, name: &str) -> bool {
        self.state.flag(name)
    }

    fn set_flag(&mut self, name: &str, value: bool) {
        self.state.set_flag(name, value);
    }

    fn input_locked(&self) -> bool {
        self.input_locked
    }

    fn set_input_locked(&mut self, locked: bool) {
        self.input_locked = locked;
    }

    fn marker(&self, id: &MarkerId) -> Option<TilePos> {
        self.markers.get(id)
    }

    fn has_npc_unit(&self, id: &NpcId) -> bool {
        self.npcs.contains(id)
    }

    fn relocate_npc(&mut self, id: &NpcId, tile: TilePos) -> bool {
        self.npcs.relocate(id, tile)
    }

    fn walk_npc_to(&mut self, id: &NpcId, target: TilePos, despawn_on_arrival: bool) -> bool {
        self.npcs.set_walk_to(id, target, despawn_on_arrival)
    }

    fn remove_npc(&mut self, id: &NpcId) {
        self.npcs.remove(id);
    }

    fn has_party_member(&self, id: &str) -> bool {
        self.state.has_party_member(id)
    }

    fn add_party_member(&mut self, member: PartyMember) {
        self.state.add_party_member(member);
    }

    fn set_npc_role(&mut self, id: &NpcId, role: &str) {
        self.state.npc_mut(id).role = Some(role.to_string());
    }

    fn record_event_assignment(&mut self, id: &NpcId, role: &str) {
        self.event_assignments.insert(id.clone(), role.to_string());
    }
}
