//! Per-run interpreter state.

use game_world::NpcId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

use crate::document::{DialogueStep, RoleOutcomesStep, Step};

/// What a suspended interpreter is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitReason {
    /// A dialogue opened by the event to close.
    Dialogue,
    /// The player to talk to one of the pending NPCs.
    TalkBlock,
    /// A role-assignment sequence to finish.
    AssignRoles,
}

/// Identifier of one run of an event, carried in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the interpreter tracks for the event it is running.
///
/// Created fresh by `start` and dropped by `finish`.
#[derive(Debug, Clone)]
pub struct InterpreterState {
    pub once_flag: Option<String>,
    pub steps: Vec<Step>,
    /// Index of the next step to look at.
    pub cursor: usize,
    pub waiting: Option<WaitReason>,
    /// Talk steps of the current block, by the NPC they wait for.
    pub talk_pending: HashMap<NpcId, DialogueStep>,
    /// `post` steps still to run, front first.
    pub deferred: VecDeque<Step>,
    /// NPC of the last talk step the player triggered.
    pub last_talked: Option<NpcId>,
    /// Outcome table consulted whenever a role is assigned.
    pub role_outcomes: Option<RoleOutcomesStep>,
    pub run_id: RunId,
}

impl Default for InterpreterState {
    fn default() -> Self {
        Self {
            once_flag: None,
            steps: Vec::new(),
            cursor: 0,
            waiting: None,
            talk_pending: HashMap::new(),
            deferred: VecDeque::new(),
            last_talked: None,
            role_outcomes: None,
            run_id: RunId::nil(),
        }
    }
}
