//! Event documents - the declarative scripts the interpreter plays back.
//!
//! A document is a JSON object:
//!
//! ```json
//! {
//!   "once_flag": "intro_done",
//!   "steps": [
//!     {"type": "dialogue", "trigger": "talk", "npc_id": "npc1", "speaker": "A", "lines": ["hi"]},
//!     {"type": "assign_roles", "npcs": ["npc1"], "roles": ["soldier", "advisor"]},
//!     {"type": "set_flag", "flag": "intro_done"}
//!   ]
//! }
//! ```
//!
//! Unknown step types and unknown keys load fine and are skipped at run time,
//! so older engines can play newer documents. Only a document that is not
//! valid JSON, or whose known fields have the wrong shape, fails to load.

mod choice;
mod step;

pub use choice::*;
pub use step::*;

use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Failure to load an event document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid event document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An authoring problem that does not stop the document from running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentWarning {
    #[error("{count} apply_role_outcomes steps; only the last one takes effect")]
    MultipleRoleOutcomes { count: usize },

    #[error("step {index}: talk-triggered dialogue without npc_id is never shown")]
    TalkStepWithoutNpc { index: usize },

    #[error("step {index}: npc_from=last_talk but no talk step comes before it")]
    LastTalkWithoutTalk { index: usize },

    #[error("step {index}: roles can hold {capacity} NPCs but {npcs} need a role")]
    CapacityBelowNpcCount {
        index: usize,
        capacity: i64,
        npcs: usize,
    },

    #[error("step {index}: assign_roles offers no roles")]
    NoRoles { index: usize },

    #[error("step {index}: unknown step type '{kind}' is ignored")]
    UnknownStepType { index: usize, kind: String },

    #[error("step {index}: unknown option action '{action}' behaves like close")]
    UnknownAction { index: usize, action: String },
}

/// A parsed event.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EventDocument {
    /// Flag that marks the event as done; the event never runs again once set.
    #[serde(default)]
    pub once_flag: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
}

impl EventDocument {
    /// Create a document from steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            once_flag: None,
            steps,
        }
    }

    /// Gate the document behind a once-flag.
    pub fn with_once_flag(mut self, flag: impl Into<String>) -> Self {
        self.once_flag = Some(flag.into());
        self
    }

    /// Parse a document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a document from a reader (usually an asset file).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, DocumentError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_json_str(&text)
    }

    /// Load a document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The once-flag, ignoring a blank one.
    pub fn once_flag(&self) -> Option<&str> {
        self.once_flag.as_deref().filter(|f| !f.is_empty())
    }

    /// Check the document for authoring mistakes.
    ///
    /// Nested `post` steps are reported under the index of the top-level
    /// step that owns them.
    pub fn lint(&self) -> Vec<DocumentWarning> {
        let mut warnings = Vec::new();
        let mut outcome_steps = 0;
        let mut seen_talk = false;

        for (index, step) in self.steps.iter().enumerate() {
            if step.trigger() == Trigger::Talk {
                seen_talk = true;
            }
            lint_step(step, index, seen_talk, &mut outcome_steps, &mut warnings);
        }

        if outcome_steps > 1 {
            warnings.push(DocumentWarning::MultipleRoleOutcomes {
                count: outcome_steps,
            });
        }

        warnings
    }
}

fn lint_step(
    step: &Step,
    index: usize,
    seen_talk: bool,
    outcome_steps: &mut usize,
    warnings: &mut Vec<DocumentWarning>,
) {
    match step {
        Step::Dialogue(d) => {
            if d.trigger == Trigger::Talk && d.talk_target().is_none() {
                warnings.push(DocumentWarning::TalkStepWithoutNpc { index });
            }
            for choice in &d.choices {
                if let Action::Unknown(action) = &choice.action {
                    warnings.push(DocumentWarning::UnknownAction {
                        index,
                        action: action.clone(),
                    });
                }
            }
            for post in &d.post {
                lint_step(post, index, seen_talk, outcome_steps, warnings);
            }
        }
        Step::AssignRoles(a) => {
            let npcs = match a.npc_from {
                Some(NpcSource::LastTalk) => {
                    if !seen_talk {
                        warnings.push(DocumentWarning::LastTalkWithoutTalk { index });
                    }
                    1
                }
                _ => a.npcs.len(),
            };

            if a.roles.is_empty() {
                warnings.push(DocumentWarning::NoRoles { index });
            } else {
                let capacity: i64 = a.roles.iter().map(|r| a.capacity(r).max(0)).sum();
                if capacity < npcs as i64 {
                    warnings.push(DocumentWarning::CapacityBelowNpcCount {
                        index,
                        capacity,
                        npcs,
                    });
                }
            }
        }
        Step::ApplyRoleOutcomes(_) => *outcome_steps += 1,
        Step::Unknown { kind, .. } => warnings.push(DocumentWarning::UnknownStepType {
            index,
            kind: kind.clone(),
        }),
        Step::ApplyRoleSpawns(_) | Step::SetFlag(_) => {}
    }
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
