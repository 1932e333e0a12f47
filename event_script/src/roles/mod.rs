//! Role assignment - give each of N NPCs a role from a constrained pool.
//!
//! The controller walks its NPC queue one prompt at a time:
//!
//! - `start` computes remaining capacity per role and returns the first prompt
//! - `assign` records the chosen role, applies its outcome and moves on
//! - `skip` moves on without assigning
//!
//! Each call returns a [`RoleProgress`]: the next prompt to show, or the
//! finished assignments once the queue is exhausted. The controller never
//! draws anything itself; prompts are presented through the dialogue
//! controller by the interpreter.

mod ledger;
mod outcomes;
mod spawns;

pub use ledger::*;
pub use outcomes::*;
pub use spawns::*;

use game_world::NpcId;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::document::{Action, AssignRolesStep, Choice, RoleOutcomesStep};
use crate::world::World;

/// A prompt asking the player to pick a role for one NPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePrompt {
    pub npc_id: NpcId,
    pub speaker: String,
    pub lines: Vec<String>,
    pub options: Vec<Choice>,
}

/// What the role controller needs next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProgress {
    /// Not running.
    Idle,
    /// Show this prompt.
    Prompt(RolePrompt),
    /// Every NPC was handled; these are the assignments made.
    Finished(AssignmentLedger),
}

/// State of one role-assignment sequence.
#[derive(Debug, Clone, Default)]
pub struct RoleAssignmentController {
    active: bool,
    npcs: Vec<NpcId>,
    roles: Vec<String>,
    remaining: HashMap<String, u32>,
    index: usize,
    local: AssignmentLedger,
    flag_on_assign: HashMap<String, String>,
}

impl RoleAssignmentController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a sequence for `npcs`.
    ///
    /// Capacity starts from the step's constraints (default 1) minus roles
    /// already handed out earlier in the event, clamped at zero. A step
    /// without roles has nothing to offer and finishes at once.
    pub fn start(
        &mut self,
        npcs: Vec<NpcId>,
        step: &AssignRolesStep,
        committed: &AssignmentLedger,
        config: &EngineConfig,
    ) -> RoleProgress {
        self.active = true;
        self.npcs = npcs;
        self.roles = step.roles.clone();
        self.flag_on_assign = step.flag_on_assign.clone();
        self.index = 0;
        self.local = AssignmentLedger::new();

        if self.roles.is_empty() {
            warn!(npcs = self.npcs.len(), "assign_roles step without roles, skipping");
            self.npcs.clear();
            self.remaining.clear();
            return self.progress(config);
        }

        self.remaining = self
            .roles
            .iter()
            .map(|role| {
                let left = step.capacity(role) - committed.count_role(role) as i64;
                (role.clone(), left.clamp(0, u32::MAX as i64) as u32)
            })
            .collect();

        debug!(npcs = self.npcs.len(), roles = self.roles.len(), "role assignment started");
        self.progress(config)
    }

    /// Give the current NPC `role`.
    ///
    /// The role is written to the shared `ledger`, mirrored into the world
    /// and persisted on the NPC's record; the step's flag for the role is
    /// raised and the role's outcome from `outcomes` applied.
    pub fn assign<W: World>(
        &mut self,
        role: &str,
        ledger: &mut AssignmentLedger,
        world: &mut W,
        outcomes: Option<&RoleOutcomesStep>,
        config: &EngineConfig,
    ) -> RoleProgress {
        if !self.active {
            return RoleProgress::Idle;
        }
        let Some(npc_id) = self.npcs.get(self.index).cloned() else {
            return RoleProgress::Idle;
        };

        debug!(npc = %npc_id, role, "role assigned");
        self.local.record(npc_id.clone(), role);
        ledger.record(npc_id.clone(), role);
        world.record_event_assignment(&npc_id, role);
        world.set_npc_role(&npc_id, role);

        if let Some(flag) = self.flag_on_assign.get(role) {
            world.set_flag(flag, true);
        }

        if let Some(outcome) = outcomes.and_then(|o| o.roles.get(role)) {
            apply_role_outcome(world, &npc_id, outcome, &config.recruit);
        }

        if let Some(left) = self.remaining.get_mut(role) {
            *left = left.saturating_sub(1);
        }

        self.index += 1;
        self.progress(config)
    }

    /// Move past the current NPC without giving it a role.
    pub fn skip(&mut self, config: &EngineConfig) -> RoleProgress {
        if !self.active {
            return RoleProgress::Idle;
        }
        if let Some(npc_id) = self.npcs.get(self.index) {
            debug!(npc = %npc_id, "role assignment skipped");
        }
        self.index += 1;
        self.progress(config)
    }

    /// The prompt for the current NPC, or the result once none are left.
    pub fn progress(&mut self, config: &EngineConfig) -> RoleProgress {
        if !self.active {
            return RoleProgress::Idle;
        }

        match self.npcs.get(self.index) {
            Some(npc_id) => RoleProgress::Prompt(self.prompt(npc_id, config)),
            None => {
                self.active = false;
                debug!(assigned = self.local.len(), "role assignment finished");
                RoleProgress::Finished(std::mem::take(&mut self.local))
            }
        }
    }

    fn prompt(&self, npc_id: &NpcId, config: &EngineConfig) -> RolePrompt {
        let texts = &config.role_prompt;

        let remaining = self
            .roles
            .iter()
            .map(|role| format!("{}: {}", role, self.remaining_for(role)))
            .collect::<Vec<_>>()
            .join(" ");

        let mut options: Vec<Choice> = self
            .roles
            .iter()
            .filter(|role| self.remaining_for(role) > 0)
            .map(|role| Choice::new(role.clone(), Action::AssignRole(role.clone())))
            .collect();

        // Every role is spent: offer them all rather than an empty menu
        if options.is_empty() {
            options = self
                .roles
                .iter()
                .map(|role| Choice::new(role.clone(), Action::AssignRole(role.clone())))
                .collect();
        }

        RolePrompt {
            npc_id: npc_id.clone(),
            speaker: texts.speaker.clone(),
            lines: vec![
                texts.target_line.replace("{npc}", npc_id.as_str()),
                format!("{} {}", texts.remaining_prefix, remaining),
            ],
            options,
        }
    }

    /// Whether a sequence is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The NPC currently being prompted.
    pub fn current_npc(&self) -> Option<&NpcId> {
        if self.active {
            self.npcs.get(self.index)
        } else {
            None
        }
    }

    /// Position in the NPC queue.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Remaining capacity of a role (0 for roles not in the pool).
    pub fn remaining_for(&self, role: &str) -> u32 {
        self.remaining.get(role).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_world::{GameState, MarkerId, Overworld, TilePos};

    use crate::document::{OutcomeConfig, OutcomeEffect};

    fn step(npcs: &[&str], roles: &[&str], constraints: &[(&str, i64)]) -> AssignRolesStep {
        AssignRolesStep {
            npcs: npcs.iter().map(|n| NpcId::from(*n)).collect(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            constraints: constraints.iter().map(|(r, c)| (r.to_string(), *c)).collect(),
            ..Default::default()
        }
    }

    fn expect_prompt(progress: RoleProgress) -> RolePrompt {
        match progress {
            RoleProgress::Prompt(prompt) => prompt,
            other => panic!("expected a prompt, got {:?}", other),
        }
    }

    fn option_roles(prompt: &RolePrompt) -> Vec<String> {
        prompt.options.iter().map(|c| c.text.clone()).collect()
    }

    #[test]
    fn test_first_prompt() {
        let config = EngineConfig::default();
        let mut roles = RoleAssignmentController::new();
        let step = step(&["npc1", "npc2"], &["soldier", "advisor"], &[("soldier", 2)]);

        let prompt = expect_prompt(roles.start(
            step.npcs.clone(),
            &step,
            &AssignmentLedger::new(),
            &config,
        ));

        assert!(roles.is_active());
        assert_eq!(prompt.npc_id, NpcId::from("npc1"));
        assert_eq!(prompt.speaker, "Role assignment");
        assert_eq!(
            prompt.lines,
            vec![
                "Assign a role to: npc1".to_string(),
                "Remaining -> soldier: 2 advisor: 1".to_string(),
            ]
        );
        assert_eq!(
            prompt.options[0].action,
            Action::AssignRole("soldier".to_string())
        );
    }

    #[test]
    fn test_committed_roles_reduce_capacity() {
        let config = EngineConfig::default();
        let mut roles = RoleAssignmentController::new();
        let step = step(&["npc3"], &["soldier", "advisor"], &[("soldier", 2)]);
        let committed: AssignmentLedger = [("npc1", "soldier"), ("npc2", "advisor"), ("npc0", "advisor")]
            .into_iter()
            .collect();

        let prompt = expect_prompt(roles.start(step.npcs.clone(), &step, &committed, &config));

        assert_eq!(roles.remaining_for("soldier"), 1);
        // Two advisors against a capacity of one clamps at zero
        assert_eq!(roles.remaining_for("advisor"), 0);
        assert_eq!(option_roles(&prompt), vec!["soldier".to_string()]);
    }

    #[test]
    fn test_assign_walks_queue_and_finishes() {
        let config = EngineConfig::default();
        let mut world = Overworld::new(GameState::new());
        let mut ledger = AssignmentLedger::new();
        let mut roles = RoleAssignmentController::new();
        let step = step(&["a", "b"], &["soldier", "advisor"], &[]);

        roles.start(step.npcs.clone(), &step, &ledger, &config);

        let prompt = expect_prompt(roles.assign("soldier", &mut ledger, &mut world, None, &config));
        assert_eq!(prompt.npc_id, NpcId::from("b"));
        assert_eq!(option_roles(&prompt), vec!["advisor".to_string()]);

        let finished = roles.assign("advisor", &mut ledger, &mut world, None, &config);
        let RoleProgress::Finished(local) = finished else {
            panic!("expected the sequence to finish");
        };

        assert!(!roles.is_active());
        assert_eq!(local.len(), 2);
        assert_eq!(ledger.role_of(&NpcId::from("a")), Some("soldier"));
        assert_eq!(world.state.npc_role(&NpcId::from("b")), Some("advisor"));
        assert_eq!(world.event_assignments.len(), 2);

        // Nothing left to do
        assert_eq!(
            roles.assign("soldier", &mut ledger, &mut world, None, &config),
            RoleProgress::Idle
        );
    }

    #[test]
    fn test_exhausted_pool_offers_every_role() {
        let config = EngineConfig::default();
        let mut world = Overworld::new(GameState::new());
        let mut ledger = AssignmentLedger::new();
        let mut roles = RoleAssignmentController::new();
        let step = step(&["a", "b"], &["soldier", "advisor"], &[("soldier", 1), ("advisor", 0)]);

        roles.start(step.npcs.clone(), &step, &ledger, &config);
        let prompt = expect_prompt(roles.assign("soldier", &mut ledger, &mut world, None, &config));

        assert_eq!(roles.remaining_for("soldier"), 0);
        assert_eq!(
            option_roles(&prompt),
            vec!["soldier".to_string(), "advisor".to_string()]
        );
    }

    #[test]
    fn test_skip_moves_on_without_assigning() {
        let config = EngineConfig::default();
        let mut roles = RoleAssignmentController::new();
        let step = step(&["a", "b"], &["soldier"], &[("soldier", 2)]);

        roles.start(step.npcs.clone(), &step, &AssignmentLedger::new(), &config);
        let prompt = expect_prompt(roles.skip(&config));
        assert_eq!(prompt.npc_id, NpcId::from("b"));
        assert_eq!(roles.remaining_for("soldier"), 2);

        let RoleProgress::Finished(local) = roles.skip(&config) else {
            panic!("expected the sequence to finish");
        };
        assert!(local.is_empty());
        assert_eq!(roles.skip(&config), RoleProgress::Idle);
    }

    #[test]
    fn test_empty_queue_finishes_immediately() {
        let config = EngineConfig::default();
        let mut roles = RoleAssignmentController::new();
        let step = step(&[], &["soldier"], &[]);

        let progress = roles.start(Vec::new(), &step, &AssignmentLedger::new(), &config);
        assert_eq!(progress, RoleProgress::Finished(AssignmentLedger::new()));
        assert!(!roles.is_active());
    }

    #[test]
    fn test_no_roles_finishes_immediately() {
        let config = EngineConfig::default();
        let mut roles = RoleAssignmentController::new();
        let step = step(&["ana", "ben"], &[], &[]);

        let progress = roles.start(step.npcs.clone(), &step, &AssignmentLedger::new(), &config);

        assert_eq!(progress, RoleProgress::Finished(AssignmentLedger::new()));
        assert!(!roles.is_active());
        assert_eq!(roles.current_npc(), None);
    }

    #[test]
    fn test_assign_raises_flag_and_applies_outcome() {
        let config = EngineConfig::default();
        let mut world = Overworld::new(GameState::new())
            .with_marker("council_room", TilePos::new(8, 8))
            .with_npc("iraen", TilePos::new(0, 0));
        let mut ledger = AssignmentLedger::new();
        let mut roles = RoleAssignmentController::new();

        let mut step = step(&["iraen"], &["advisor"], &[]);
        step.flag_on_assign
            .insert("advisor".to_string(), "advisor_chosen".to_string());

        let mut outcomes = RoleOutcomesStep::default();
        outcomes.roles.insert(
            "advisor".to_string(),
            OutcomeConfig {
                move_to: Some(MarkerId::from("council_room")),
                despawn_on_arrival: false,
                effects: vec![OutcomeEffect::JoinParty { name: None }],
            },
        );

        roles.start(step.npcs.clone(), &step, &ledger, &config);
        roles.assign("advisor", &mut ledger, &mut world, Some(&outcomes), &config);

        assert!(world.state.flag("advisor_chosen"));
        assert!(world.state.has_party_member("iraen"));
        let task = world.npcs.get(&NpcId::from("iraen")).unwrap().task.unwrap();
        assert_eq!(task.target, TilePos::new(8, 8));
    }
}
