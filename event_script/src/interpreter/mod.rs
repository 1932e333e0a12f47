//! Event interpreter - runs an event document against the world.
//!
//! The interpreter is a small state machine. `advance` executes auto steps
//! until one of them has to wait for the player, then records a
//! [`WaitReason`] and returns. The host resumes it through the public entry
//! points:
//!
//! - `on_player_interact` when the player talks to an NPC
//! - `handle_input` for key presses while a dialogue is open
//! - `on_dialogue_closed` / `on_assign_roles_done` when those finish
//!
//! Consecutive talk-triggered steps form a *talk block*: the player may
//! complete them in any order, and the event moves on once all are done.

mod state;

pub use state::*;

use game_world::NpcId;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dialogue::{
    DialogueContext, DialogueController, DialoguePurpose, DialogueSignal, InputEvent, Resume,
};
use crate::document::{
    Action, AssignRolesStep, Choice, DialogueStep, EventDocument, NpcSource, RoleOutcomesStep, Step,
    Trigger,
};
use crate::roles::{
    apply_role_spawns, recruit, AssignmentLedger, RecruitOutcome, RoleAssignmentController,
    RoleProgress,
};
use crate::world::World;

/// Runs one event at a time.
#[derive(Debug, Clone)]
pub struct EventInterpreter {
    active: bool,
    state: InterpreterState,
    /// NPC -> role for the current event. Kept after `finish` until the next
    /// `start`.
    assignments: AssignmentLedger,
    dialogue: DialogueController,
    roles: RoleAssignmentController,
    /// The host already held the input lock when the open ambient dialogue
    /// was opened, so closing it must not release the lock.
    host_locked: bool,
    config: EngineConfig,
}

impl Default for EventInterpreter {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EventInterpreter {
    /// Create an idle interpreter.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            active: false,
            state: InterpreterState::default(),
            assignments: AssignmentLedger::new(),
            dialogue: DialogueController::new(config.placeholder_line.clone()),
            roles: RoleAssignmentController::new(),
            host_locked: false,
            config,
        }
    }

    /// Start running `doc`.
    ///
    /// Returns false, touching nothing but the input lock, when the
    /// document's once-flag is already set.
    pub fn start<W: World>(&mut self, world: &mut W, doc: &EventDocument) -> bool {
        self.active = false;
        self.state = InterpreterState::default();
        self.assignments.clear();
        self.roles = RoleAssignmentController::new();
        self.dialogue.close();
        self.host_locked = false;

        if let Some(flag) = doc.once_flag() {
            if world.flag(flag) {
                info!(flag, "event already done, skipping");
                world.set_input_locked(false);
                return false;
            }
        }

        let run_id = RunId::new();
        for warning in doc.lint() {
            warn!(run = %run_id, "{}", warning);
        }

        self.state = InterpreterState {
            once_flag: doc.once_flag().map(str::to_string),
            steps: doc.steps.clone(),
            role_outcomes: last_role_outcomes(&doc.steps).cloned(),
            run_id,
            ..Default::default()
        };
        self.active = true;
        world.set_input_locked(true);

        info!(run = %run_id, steps = self.state.steps.len(), "event started");
        self.advance(world);
        true
    }

    /// Run auto steps until one suspends or the document ends.
    pub fn advance<W: World>(&mut self, world: &mut W) {
        loop {
            if !self.active || self.state.waiting.is_some() {
                return;
            }

            let Some(step) = self.state.steps.get(self.state.cursor) else {
                self.finish(world);
                return;
            };

            if step.trigger() == Trigger::Talk {
                if self.collect_talk_block(world) {
                    return;
                }
                continue;
            }

            let step = step.clone();
            self.state.cursor += 1;
            self.exec_step(world, step);
        }
    }

    /// Consume consecutive talk steps into the pending map.
    ///
    /// Returns true when at least one NPC is now waited for.
    fn collect_talk_block<W: World>(&mut self, world: &mut W) -> bool {
        self.state.talk_pending.clear();

        while let Some(Step::Dialogue(step)) = self.state.steps.get(self.state.cursor) {
            if step.trigger != Trigger::Talk {
                break;
            }
            match step.talk_target() {
                Some(npc_id) => {
                    self.state.talk_pending.insert(npc_id.clone(), step.clone());
                }
                None => warn!(
                    run = %self.state.run_id,
                    index = self.state.cursor,
                    "talk step without npc_id dropped"
                ),
            }
            self.state.cursor += 1;
        }

        if self.state.talk_pending.is_empty() {
            return false;
        }

        debug!(
            run = %self.state.run_id,
            pending = self.state.talk_pending.len(),
            "waiting on talk block"
        );
        world.set_input_locked(false);
        self.state.waiting = Some(WaitReason::TalkBlock);
        true
    }

    /// The player talked to `npc_id`.
    ///
    /// Returns true when the NPC had a pending talk step and its dialogue
    /// was opened; the host should then not open its own dialogue.
    pub fn on_player_interact<W: World>(&mut self, world: &mut W, npc_id: &NpcId) -> bool {
        if !self.active || self.state.waiting != Some(WaitReason::TalkBlock) {
            return false;
        }
        let Some(step) = self.state.talk_pending.remove(npc_id) else {
            return false;
        };

        debug!(run = %self.state.run_id, npc = %npc_id, "talk step triggered");
        self.state.last_talked = Some(npc_id.clone());
        self.state.waiting = None;
        world.set_input_locked(true);
        self.exec_dialogue(step, Some(npc_id.clone()));
        true
    }

    /// A dialogue opened by the event has closed.
    pub fn on_dialogue_closed<W: World>(&mut self, world: &mut W) {
        if !self.active || self.state.waiting != Some(WaitReason::Dialogue) {
            return;
        }
        self.state.waiting = None;
        self.resume(world);
    }

    /// A role-assignment sequence has finished with `assignments`.
    pub fn on_assign_roles_done<W: World>(&mut self, world: &mut W, assignments: &AssignmentLedger) {
        if !self.active {
            return;
        }

        self.assignments.merge(assignments);
        for (npc_id, role) in assignments.iter() {
            world.record_event_assignment(npc_id, role);
        }

        if self.state.waiting != Some(WaitReason::AssignRoles) {
            return;
        }
        self.state.waiting = None;
        self.resume(world);
    }

    /// Continue after a dialogue or assignment: deferred post steps first,
    /// then the rest of the talk block, then the next auto steps.
    fn resume<W: World>(&mut self, world: &mut W) {
        while let Some(step) = self.state.deferred.pop_front() {
            self.exec_step(world, step);
            if !self.active || self.state.waiting.is_some() {
                return;
            }
        }

        if !self.state.talk_pending.is_empty() {
            world.set_input_locked(false);
            self.state.waiting = Some(WaitReason::TalkBlock);
            return;
        }

        world.set_input_locked(true);
        self.advance(world);
    }

    /// End the event: raise its once-flag and release the player.
    pub fn finish<W: World>(&mut self, world: &mut W) {
        if let Some(flag) = &self.state.once_flag {
            world.set_flag(flag, true);
        }
        if self.active {
            info!(run = %self.state.run_id, assigned = self.assignments.len(), "event finished");
        }

        self.state = InterpreterState::default();
        self.roles = RoleAssignmentController::new();
        self.dialogue.close();
        self.active = false;
        world.set_input_locked(false);
    }

    fn exec_step<W: World>(&mut self, world: &mut W, step: Step) {
        debug!(run = %self.state.run_id, step = step.kind(), "executing step");

        match step {
            Step::Dialogue(dialogue) => {
                let npc_id = dialogue.talk_target().cloned();
                self.exec_dialogue(dialogue, npc_id);
            }
            Step::AssignRoles(assign) => self.exec_assign_roles(world, &assign),
            Step::SetFlag(set) => match &set.flag {
                Some(flag) if !flag.is_empty() => world.set_flag(flag, set.value),
                _ => warn!(run = %self.state.run_id, "set_flag step without a flag name"),
            },
            Step::ApplyRoleOutcomes(outcomes) => {
                self.state.role_outcomes = Some(outcomes);
            }
            Step::ApplyRoleSpawns(spawns) => {
                let moved = apply_role_spawns(world, &spawns, &self.assignments);
                debug!(run = %self.state.run_id, moved, "role spawns applied");
            }
            Step::Unknown { kind, .. } => {
                debug!(run = %self.state.run_id, kind = %kind, "skipping unknown step");
            }
        }
    }

    fn exec_dialogue(&mut self, step: DialogueStep, npc_id: Option<NpcId>) {
        // Post steps run right after this dialogue, ahead of anything queued
        for post in step.post.into_iter().rev() {
            self.state.deferred.push_front(post);
        }

        self.state.waiting = Some(WaitReason::Dialogue);
        self.dialogue.open(
            step.speaker,
            step.lines,
            step.choices,
            DialogueContext::script(npc_id),
        );
    }

    fn exec_assign_roles<W: World>(&mut self, world: &mut W, step: &AssignRolesStep) {
        let npcs = match step.npc_from {
            Some(NpcSource::LastTalk) => match &self.state.last_talked {
                Some(npc_id) => vec![npc_id.clone()],
                None => {
                    warn!(run = %self.state.run_id, "npc_from last_talk before any talk, skipping");
                    return;
                }
            },
            Some(NpcSource::Unsupported) => {
                debug!(run = %self.state.run_id, "unsupported npc_from, using the npcs list");
                step.npcs.clone()
            }
            None => step.npcs.clone(),
        };

        self.state.waiting = Some(WaitReason::AssignRoles);
        let progress = self.roles.start(npcs, step, &self.assignments, &self.config);
        self.drive_roles(world, progress);
    }

    /// Present what the role controller asks for.
    fn drive_roles<W: World>(&mut self, world: &mut W, progress: RoleProgress) {
        match progress {
            RoleProgress::Prompt(prompt) => self.dialogue.open(
                prompt.speaker,
                prompt.lines,
                prompt.options,
                DialogueContext {
                    purpose: DialoguePurpose::AssignRoles,
                    npc_id: Some(prompt.npc_id),
                },
            ),
            RoleProgress::Finished(local) => {
                self.dialogue.close();
                self.on_assign_roles_done(world, &local);
            }
            RoleProgress::Idle => {}
        }
    }

    /// Route a key press to the open dialogue.
    ///
    /// Returns false when no dialogue is open and the input is free for
    /// the host to use.
    pub fn handle_input<W: World>(&mut self, world: &mut W, input: InputEvent) -> bool {
        let in_progress = self.roles.is_active();
        let Some(signal) = self.dialogue.handle_input(input, in_progress) else {
            return false;
        };
        self.dispatch(world, signal);
        true
    }

    /// Resolve the option under the dialogue cursor, as if confirmed.
    pub fn confirm<W: World>(&mut self, world: &mut W) {
        let signal = self.dialogue.confirm();
        self.dispatch(world, signal);
    }

    fn dispatch<W: World>(&mut self, world: &mut W, signal: DialogueSignal) {
        match signal {
            DialogueSignal::Consumed => {}
            DialogueSignal::Closed(resume) => self.after_close(world, resume),
            DialogueSignal::Continue(resume) => {
                self.after_close(world, resume);
                self.advance(world);
            }
            DialogueSignal::AssignRole(role) => {
                let progress = self.roles.assign(
                    &role,
                    &mut self.assignments,
                    world,
                    self.state.role_outcomes.as_ref(),
                    &self.config,
                );
                self.drive_roles(world, progress);
            }
            DialogueSignal::SkipAssignment => {
                let progress = self.roles.skip(&self.config);
                self.drive_roles(world, progress);
            }
            DialogueSignal::Recruit {
                unit_id,
                speaker,
                npc_id,
                resume,
            } => self.recruit(world, &unit_id, &speaker, npc_id, resume),
        }
    }

    fn after_close<W: World>(&mut self, world: &mut W, resume: Resume) {
        match resume {
            Resume::Script => self.on_dialogue_closed(world),
            Resume::Nothing => {
                // Ambient chatter: give movement back unless the event or the
                // host holds it
                let event_holds = self.active && self.state.waiting != Some(WaitReason::TalkBlock);
                if !event_holds && !std::mem::take(&mut self.host_locked) {
                    world.set_input_locked(false);
                }
            }
        }
    }

    /// Recruit `unit_id` and tell the player how it went.
    ///
    /// The notice owes the same resumption as the dialogue that offered the
    /// recruit, so closing it resumes the event if that one would have.
    fn recruit<W: World>(
        &mut self,
        world: &mut W,
        unit_id: &str,
        speaker: &str,
        npc_id: Option<NpcId>,
        resume: Resume,
    ) {
        let texts = &self.config.recruit;
        let line = match recruit(world, unit_id, speaker, npc_id.as_ref(), texts) {
            RecruitOutcome::Joined => {
                info!(unit = unit_id, "unit recruited");
                texts.joined_line.replace("{name}", speaker)
            }
            RecruitOutcome::AlreadyInParty => texts.already_line.clone(),
        };
        let exit = Choice::new(texts.exit_label.clone(), Action::Close);

        self.dialogue.open(
            speaker,
            vec![line],
            vec![exit],
            DialogueContext {
                purpose: resume.purpose(),
                npc_id: None,
            },
        );
    }

    /// Open a dialogue that is not part of a script step, such as NPC
    /// chatter. Player movement stays locked while it is open; a lock the
    /// host already held is left in place when it closes.
    pub fn open_dialogue<W: World>(
        &mut self,
        world: &mut W,
        speaker: impl Into<String>,
        lines: Vec<String>,
        options: Vec<Choice>,
        context: DialogueContext,
    ) {
        self.host_locked = world.input_locked();
        world.set_input_locked(true);
        self.dialogue.open(speaker, lines, options, context);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn waiting(&self) -> Option<WaitReason> {
        self.state.waiting
    }

    /// Index of the next step to look at.
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// Roles handed out by the current (or last finished) event.
    pub fn assignments(&self) -> &AssignmentLedger {
        &self.assignments
    }

    /// NPCs the current talk block still waits for.
    pub fn pending_talks(&self) -> impl Iterator<Item = &NpcId> {
        self.state.talk_pending.keys()
    }

    pub fn dialogue(&self) -> &DialogueController {
        &self.dialogue
    }

    pub fn roles(&self) -> &RoleAssignmentController {
        &self.roles
    }

    pub fn run_id(&self) -> RunId {
        self.state.run_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// The last `apply_role_outcomes` table in document order, nested post
/// steps included.
fn last_role_outcomes(steps: &[Step]) -> Option<&RoleOutcomesStep> {
    steps.iter().fold(None, |found, step| match step {
        Step::ApplyRoleOutcomes(outcomes) => Some(outcomes),
        Step::Dialogue(dialogue) => last_role_outcomes(&dialogue.post).or(found),
        _ => found,
    })
}
