//! Step definitions - the closed set of operations an event can perform.

use game_world::{MarkerId, NpcId};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::{null_as_default, Choice};

/// When a step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum Trigger {
    /// As soon as the interpreter reaches it.
    #[default]
    Auto,
    /// When the player talks to the step's NPC.
    Talk,
}

impl From<String> for Trigger {
    fn from(raw: String) -> Self {
        if raw.eq_ignore_ascii_case("talk") {
            Trigger::Talk
        } else {
            Trigger::Auto
        }
    }
}

/// One operation of an event document.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Dialogue(DialogueStep),
    AssignRoles(AssignRolesStep),
    ApplyRoleOutcomes(RoleOutcomesStep),
    ApplyRoleSpawns(RoleSpawnsStep),
    SetFlag(SetFlagStep),
    /// A step type this engine does not know. Kept so newer documents still
    /// load; the interpreter skips it.
    Unknown { kind: String, fields: Value },
}

impl Step {
    /// Build a step from a JSON object, dispatching on its `type` key.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        Ok(match kind.as_str() {
            "dialogue" => Step::Dialogue(serde_json::from_value(value)?),
            "assign_roles" => Step::AssignRoles(serde_json::from_value(value)?),
            "apply_role_outcomes" => Step::ApplyRoleOutcomes(serde_json::from_value(value)?),
            "apply_role_spawns" => Step::ApplyRoleSpawns(serde_json::from_value(value)?),
            "set_flag" => Step::SetFlag(serde_json::from_value(value)?),
            _ => Step::Unknown {
                kind,
                fields: value,
            },
        })
    }

    /// The step's trigger. Only dialogue steps can wait for a talk.
    pub fn trigger(&self) -> Trigger {
        match self {
            Step::Dialogue(d) => d.trigger,
            _ => Trigger::Auto,
        }
    }

    /// The `type` name of the step.
    pub fn kind(&self) -> &str {
        match self {
            Step::Dialogue(_) => "dialogue",
            Step::AssignRoles(_) => "assign_roles",
            Step::ApplyRoleOutcomes(_) => "apply_role_outcomes",
            Step::ApplyRoleSpawns(_) => "apply_role_spawns",
            Step::SetFlag(_) => "set_flag",
            Step::Unknown { kind, .. } => kind,
        }
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Step::from_value(value).map_err(de::Error::custom)
    }
}

/// Show a conversation, optionally only once the player talks to an NPC.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DialogueStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub speaker: String,

    /// Pages of text. An empty list is shown as a single placeholder page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<String>,

    #[serde(default, alias = "options", deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub trigger: Trigger,

    /// Required for talk-triggered steps.
    #[serde(default)]
    pub npc_id: Option<NpcId>,

    /// Steps run right after this dialogue closes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub post: Vec<Step>,
}

impl DialogueStep {
    /// The NPC a talk step waits for, ignoring blank ids.
    pub fn talk_target(&self) -> Option<&NpcId> {
        self.npc_id.as_ref().filter(|id| !id.as_str().is_empty())
    }
}

/// Where an `assign_roles` step takes its NPCs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcSource {
    /// The NPC the player most recently talked to in a talk block.
    LastTalk,
    #[serde(other)]
    Unsupported,
}

/// Ask the player to give each NPC a role from a constrained pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AssignRolesStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub npcs: Vec<NpcId>,

    #[serde(default)]
    pub npc_from: Option<NpcSource>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<String>,

    /// Role -> how many NPCs may take it (default 1).
    #[serde(default, deserialize_with = "null_as_default")]
    pub constraints: HashMap<String, i64>,

    /// Role -> story flag raised when an NPC is given that role.
    #[serde(default, rename = "set_flag", deserialize_with = "null_as_default")]
    pub flag_on_assign: HashMap<String, String>,
}

impl AssignRolesStep {
    /// Declared capacity of a role.
    pub fn capacity(&self, role: &str) -> i64 {
        self.constraints.get(role).copied().unwrap_or(1)
    }
}

/// A typed effect applied when an NPC receives a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeEffect {
    /// The NPC joins the player's party.
    JoinParty { name: Option<String> },
    Unknown(String),
}

impl<'de> Deserialize<'de> for OutcomeEffect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept both `"join_party"` and `{"type": "join_party", ...}`
        let value = Value::deserialize(deserializer)?;
        let kind = match &value {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            other => other.to_string(),
        };

        Ok(match kind.to_ascii_lowercase().as_str() {
            "join_party" => OutcomeEffect::JoinParty {
                name: value.get("name").and_then(Value::as_str).map(str::to_string),
            },
            _ => OutcomeEffect::Unknown(kind),
        })
    }
}

/// What happens to an NPC once it is given a particular role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct OutcomeConfig {
    /// Marker the NPC walks to.
    #[serde(default)]
    pub move_to: Option<MarkerId>,

    #[serde(default, alias = "despawn")]
    pub despawn_on_arrival: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub effects: Vec<OutcomeEffect>,
}

/// Declarative role -> outcome table, consulted as each role is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RoleOutcomesStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: HashMap<String, OutcomeConfig>,
}

/// Move assigned NPCs onto markers picked by role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RoleSpawnsStep {
    /// Role key -> marker, in declaration order.
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub role_to_marker: Vec<(String, MarkerId)>,
}

/// Set a persistent story flag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetFlagStep {
    #[serde(default, alias = "name")]
    pub flag: Option<String>,
    #[serde(default = "default_true")]
    pub value: bool,
}

fn default_true() -> bool {
    true
}

fn ordered_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, MarkerId)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, MarkerId)>;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a map of role keys to marker ids")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((role, marker)) = map.next_entry::<String, MarkerId>()? {
                pairs.push((role, marker));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_any(PairsVisitor)
}
