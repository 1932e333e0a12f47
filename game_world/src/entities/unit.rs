//! Live NPC units on the current map and their movement tasks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{NpcId, TilePos};

/// Walk towards a tile, optionally leaving the map on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkTask {
    pub target: TilePos,
    pub despawn_on_arrival: bool,
}

/// A spawned NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcUnit {
    pub tile: TilePos,
    pub task: Option<WalkTask>,
}

impl NpcUnit {
    /// Create an idle unit standing on `tile`.
    pub fn new(tile: TilePos) -> Self {
        Self { tile, task: None }
    }
}

/// Registry of live NPC units keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcRegistry {
    units: HashMap<NpcId, NpcUnit>,
}

impl NpcRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a unit. Spawning an id that is already live does nothing.
    pub fn spawn(&mut self, id: NpcId, tile: TilePos) {
        self.units.entry(id).or_insert_with(|| NpcUnit::new(tile));
    }

    /// Get a live unit.
    pub fn get(&self, id: &NpcId) -> Option<&NpcUnit> {
        self.units.get(id)
    }

    /// Check whether a unit is live.
    pub fn contains(&self, id: &NpcId) -> bool {
        self.units.contains_key(id)
    }

    /// Teleport a unit. Returns false when the unit is not live.
    pub fn relocate(&mut self, id: &NpcId, tile: TilePos) -> bool {
        match self.units.get_mut(id) {
            Some(unit) => {
                unit.tile = tile;
                true
            }
            None => false,
        }
    }

    /// Give a unit a walk task, replacing any previous one.
    pub fn set_walk_to(&mut self, id: &NpcId, target: TilePos, despawn_on_arrival: bool) -> bool {
        match self.units.get_mut(id) {
            Some(unit) => {
                unit.task = Some(WalkTask {
                    target,
                    despawn_on_arrival,
                });
                true
            }
            None => false,
        }
    }

    /// Remove a unit from the map.
    pub fn remove(&mut self, id: &NpcId) -> Option<NpcUnit> {
        self.units.remove(id)
    }

    /// Number of live units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// True when no unit is live.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Advance every walk task by one tile.
    ///
    /// Units already standing on their target finish the task; those flagged
    /// `despawn_on_arrival` are removed and their ids returned.
    pub fn step_tasks(&mut self) -> Vec<NpcId> {
        let mut arrived = Vec::new();

        for (id, unit) in self.units.iter_mut() {
            let Some(task) = unit.task else {
                continue;
            };

            if unit.tile == task.target {
                unit.task = None;
                if task.despawn_on_arrival {
                    arrived.push(id.clone());
                }
                continue;
            }

            unit.tile = unit.tile.step_towards(task.target);
        }

        for id in &arrived {
            self.units.remove(id);
        }
        arrived.sort();
        arrived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_is_idempotent() {
        let mut registry = NpcRegistry::new();
        registry.spawn(NpcId::from("a"), TilePos::new(1, 1));
        registry.spawn(NpcId::from("a"), TilePos::new(9, 9));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&NpcId::from("a")).unwrap().tile, TilePos::new(1, 1));
    }

    #[test]
    fn test_relocate_missing_unit() {
        let mut registry = NpcRegistry::new();
        assert!(!registry.relocate(&NpcId::from("ghost"), TilePos::new(0, 0)));
    }

    #[test]
    fn test_walk_and_despawn() {
        let mut registry = NpcRegistry::new();
        let id = NpcId::from("loren_valcrest");
        registry.spawn(id.clone(), TilePos::new(0, 0));
        assert!(registry.set_walk_to(&id, TilePos::new(2, 0), true));

        assert!(registry.step_tasks().is_empty());
        assert!(registry.step_tasks().is_empty());
        assert_eq!(registry.get(&id).unwrap().tile, TilePos::new(2, 0));

        // Arrival tick removes the unit
        assert_eq!(registry.step_tasks(), vec![id.clone()]);
        assert!(!registry.contains(&id));
    }

    #[test]
    fn test_walk_without_despawn_keeps_unit() {
        let mut registry = NpcRegistry::new();
        let id = NpcId::from("selma_ironrose");
        registry.spawn(id.clone(), TilePos::new(0, 0));
        registry.set_walk_to(&id, TilePos::new(0, 1), false);

        registry.step_tasks();
        registry.step_tasks();

        let unit = registry.get(&id).unwrap();
        assert_eq!(unit.tile, TilePos::new(0, 1));
        assert!(unit.task.is_none());
    }
}
