//! Party roster entries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A unit that has joined the player's army.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyMember {
    pub id: String,
    pub name: String,

    // Stats and anything else the roster UI wants, kept flexible
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl PartyMember {
    /// Create a party member with no extra data.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: HashMap::new(),
        }
    }

    /// Attach an extra value (level, class, stats...).
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
