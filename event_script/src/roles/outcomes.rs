//! Effects applied to NPCs: role outcomes and recruiting.

use game_world::NpcId;
use tracing::{debug, warn};

use crate::config::RecruitConfig;
use crate::document::{OutcomeConfig, OutcomeEffect};
use crate::world::World;

/// Apply a role's outcome to the NPC that was just given the role.
///
/// A marker missing from the current map, or an NPC without a live unit,
/// skips the move; effects still apply.
pub fn apply_role_outcome<W: World>(
    world: &mut W,
    npc_id: &NpcId,
    outcome: &OutcomeConfig,
    recruit: &RecruitConfig,
) {
    if let Some(marker) = &outcome.move_to {
        match world.marker(marker) {
            Some(tile) => {
                if !world.walk_npc_to(npc_id, tile, outcome.despawn_on_arrival) {
                    debug!(npc = %npc_id, "no live unit to move");
                }
            }
            None => warn!(npc = %npc_id, marker = %marker, "outcome marker not on this map"),
        }
    }

    for effect in &outcome.effects {
        match effect {
            OutcomeEffect::JoinParty { name } => {
                if world.has_party_member(npc_id.as_str()) {
                    continue;
                }
                let name = name.as_deref().unwrap_or(npc_id.as_str());
                world.add_party_member(recruit.member(npc_id.as_str(), name));
                debug!(npc = %npc_id, "joined the party");
            }
            OutcomeEffect::Unknown(kind) => {
                debug!(npc = %npc_id, effect = %kind, "ignoring unknown outcome effect");
            }
        }
    }
}

/// Result of a recruit action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecruitOutcome {
    Joined,
    AlreadyInParty,
}

/// Recruit a unit offered through a dialogue option.
///
/// The unit joins under the speaker's name, `recruited:<unit_id>` is raised
/// and the NPC that made the offer leaves the map.
pub fn recruit<W: World>(
    world: &mut W,
    unit_id: &str,
    speaker: &str,
    npc_id: Option<&NpcId>,
    config: &RecruitConfig,
) -> RecruitOutcome {
    if world.has_party_member(unit_id) {
        return RecruitOutcome::AlreadyInParty;
    }

    world.add_party_member(config.member(unit_id, speaker));
    world.set_flag(&format!("recruited:{}", unit_id), true);

    if let Some(npc_id) = npc_id {
        world.remove_npc(npc_id);
    }

    RecruitOutcome::Joined
}
