//! Role spawns - placing assigned NPCs on markers picked by role.

use game_world::{MarkerId, NpcId};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

use super::AssignmentLedger;
use crate::document::RoleSpawnsStep;
use crate::world::World;

/// Base name of a role key: `soldier_2` -> `soldier`.
pub fn role_base(role: &str) -> &str {
    role.split_once('_').map_or(role, |(base, _)| base)
}

/// Decide which marker each assigned NPC goes to.
///
/// Markers are bucketed by the base of their role key, in declaration
/// order. NPCs are served in ledger order and take the first unused marker
/// of their role's bucket; NPCs whose bucket is empty get nothing.
pub fn plan_role_spawns(step: &RoleSpawnsStep, ledger: &AssignmentLedger) -> Vec<(NpcId, MarkerId)> {
    let mut buckets: HashMap<&str, VecDeque<&MarkerId>> = HashMap::new();
    for (role_key, marker) in &step.role_to_marker {
        buckets.entry(role_base(role_key)).or_default().push_back(marker);
    }

    ledger
        .iter()
        .filter_map(|(npc_id, role)| {
            let marker = buckets.get_mut(role_base(role))?.pop_front()?;
            Some((npc_id.clone(), marker.clone()))
        })
        .collect()
}

/// Teleport assigned NPCs with a live unit onto their planned markers.
///
/// Returns how many units were moved.
pub fn apply_role_spawns<W: World>(world: &mut W, step: &RoleSpawnsStep, ledger: &AssignmentLedger) -> usize {
    let mut moved = 0;

    for (npc_id, marker) in plan_role_spawns(step, ledger) {
        if !world.has_npc_unit(&npc_id) {
            debug!(npc = %npc_id, "no live unit to place");
            continue;
        }

        let Some(tile) = world.marker(&marker) else {
            warn!(npc = %npc_id, marker = %marker, "spawn marker not on this map");
            continue;
        };

        if world.relocate_npc(&npc_id, tile) {
            moved += 1;
        }
    }

    moved
}
