//! Dialogue choices and the actions they trigger.

use serde::Deserialize;

use super::null_as_default;

/// What confirming a dialogue option does.
///
/// Parsed once when the document is loaded so dispatch never has to split
/// strings mid-game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Close the dialogue.
    Close,
    /// Close the dialogue and let the running event advance.
    EventContinue,
    /// Recruit a unit into the party.
    Recruit { unit_id: String },
    /// Give the NPC currently being prompted this role.
    AssignRole(String),
    /// Anything else. Behaves like `Close`.
    Unknown(String),
}

impl Action {
    /// Parse the raw `action` string of a choice.
    ///
    /// `unit_id` is the choice's payload, only meaningful for `recruit`.
    pub fn parse(raw: &str, unit_id: Option<&str>) -> Self {
        if let Some(role) = raw.strip_prefix("assign_role:") {
            return Action::AssignRole(role.to_string());
        }

        match raw {
            "close" => Action::Close,
            "event_continue" => Action::EventContinue,
            "recruit" => Action::Recruit {
                unit_id: unit_id.unwrap_or("unknown").to_string(),
            },
            other => Action::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Close => write!(f, "close"),
            Action::EventContinue => write!(f, "event_continue"),
            Action::Recruit { .. } => write!(f, "recruit"),
            Action::AssignRole(role) => write!(f, "assign_role:{}", role),
            Action::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// A selectable dialogue option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawChoice")]
pub struct Choice {
    pub text: String,
    pub action: Action,
}

impl Choice {
    /// Create a choice with an already-parsed action.
    pub fn new(text: impl Into<String>, action: Action) -> Self {
        Self {
            text: text.into(),
            action,
        }
    }
}

#[derive(Deserialize)]
struct RawChoice {
    #[serde(default, deserialize_with = "null_as_default")]
    text: String,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    unit_id: Option<String>,
}

impl From<RawChoice> for Choice {
    fn from(raw: RawChoice) -> Self {
        let action = Action::parse(raw.action.as_deref().unwrap_or("close"), raw.unit_id.as_deref());
        Choice {
            text: raw.text,
            action,
        }
    }
}
