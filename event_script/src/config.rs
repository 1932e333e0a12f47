//! Engine configuration, loaded from TOML.
//!
//! Every field has a default, so a partial file (or none at all) works:
//!
//! ```toml
//! placeholder_line = "..."
//!
//! [role_prompt]
//! speaker = "Role assignment"
//!
//! [keys]
//! confirm = ["return", "space", "e"]
//! ```

use game_world::PartyMember;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::dialogue::{InputEvent, PLACEHOLDER_LINE};

/// Failure to load a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shown when a dialogue is opened without lines.
    pub placeholder_line: String,
    pub role_prompt: RolePromptConfig,
    pub recruit: RecruitConfig,
    pub hints: DialogueHints,
    pub keys: KeyBindings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placeholder_line: PLACEHOLDER_LINE.to_string(),
            role_prompt: RolePromptConfig::default(),
            recruit: RecruitConfig::default(),
            hints: DialogueHints::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Texts of the role-assignment prompt.
///
/// `{npc}` in `target_line` is replaced with the id of the NPC being prompted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePromptConfig {
    pub speaker: String,
    pub target_line: String,
    pub remaining_prefix: String,
}

impl Default for RolePromptConfig {
    fn default() -> Self {
        Self {
            speaker: "Role assignment".to_string(),
            target_line: "Assign a role to: {npc}".to_string(),
            remaining_prefix: "Remaining ->".to_string(),
        }
    }
}

/// Starting stats of recruited units and the notices shown after recruiting.
///
/// `{name}` in `joined_line` is replaced with the recruit's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecruitConfig {
    pub level: u32,
    pub class: String,
    pub hp: u32,
    pub atk: u32,
    pub def: u32,
    pub joined_line: String,
    pub already_line: String,
    pub exit_label: String,
}

impl Default for RecruitConfig {
    fn default() -> Self {
        Self {
            level: 1,
            class: "soldier".to_string(),
            hp: 18,
            atk: 5,
            def: 3,
            joined_line: "{name} has joined your army.".to_string(),
            already_line: "Already part of your army.".to_string(),
            exit_label: "Leave".to_string(),
        }
    }
}

impl RecruitConfig {
    /// A fresh party member with the configured starting stats.
    pub fn member(&self, id: &str, name: &str) -> PartyMember {
        PartyMember::new(id, name)
            .with_extra("level", self.level)
            .with_extra("class", self.class.clone())
            .with_extra("hp", self.hp)
            .with_extra("atk", self.atk)
            .with_extra("def", self.def)
    }
}

/// Control hints drawn in the corner of the dialogue box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueHints {
    pub options: String,
    pub lines: String,
}

impl Default for DialogueHints {
    fn default() -> Self {
        Self {
            options: "W/S: choose  ENTER: confirm  ESC: close".to_string(),
            lines: "ENTER/SPACE/ESC: close".to_string(),
        }
    }
}

/// Raw key names bound to dialogue inputs. Names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        fn keys(names: &[&str]) -> Vec<String> {
            names.iter().map(|n| n.to_string()).collect()
        }

        Self {
            up: keys(&["w", "up"]),
            down: keys(&["s", "down"]),
            confirm: keys(&["return", "space"]),
            cancel: keys(&["escape", "backspace"]),
        }
    }
}

impl KeyBindings {
    /// Map a raw key name to a dialogue input.
    pub fn resolve(&self, key: &str) -> InputEvent {
        let bound = |names: &[String]| names.iter().any(|n| n.eq_ignore_ascii_case(key));

        if bound(&self.cancel) {
            InputEvent::Cancel
        } else if bound(&self.confirm) {
            InputEvent::Confirm
        } else if bound(&self.up) {
            InputEvent::Up
        } else if bound(&self.down) {
            InputEvent::Down
        } else {
            InputEvent::Other
        }
    }
}
