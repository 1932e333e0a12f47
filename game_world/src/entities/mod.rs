//! Entity definitions for the game world.

mod party;
mod unit;

pub use party::*;
pub use unit::*;

use serde::{Deserialize, Serialize};

/// Identifier of an NPC, as written in event documents and map data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NpcId(pub String);

impl NpcId {
    /// Create an NPC id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NpcId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NpcId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a named marker placed on the current map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub String);

impl MarkerId {
    /// Create a marker id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MarkerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    /// Create a tile position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// One grid step towards `target`, resolving the x axis before the y axis.
    pub fn step_towards(self, target: TilePos) -> TilePos {
        let dx = (target.x - self.x).signum();
        if dx != 0 {
            return TilePos::new(self.x + dx, self.y);
        }
        TilePos::new(self.x, self.y + (target.y - self.y).signum())
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_npc_id_display() {
        let id = NpcId::from("selma_ironrose");
        assert_eq!(id.to_string(), "selma_ironrose");
        assert_eq!(id.as_str(), "selma_ironrose");
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&NpcId::from("npc1")).unwrap();
        assert_eq!(json, "\"npc1\"");

        let marker: MarkerId = serde_json::from_str("\"line_1\"").unwrap();
        assert_eq!(marker, MarkerId::from("line_1"));
    }

    #[test]
    fn test_step_towards_moves_x_first() {
        let start = TilePos::new(0, 0);
        let target = TilePos::new(2, -1);

        let first = start.step_towards(target);
        assert_eq!(first, TilePos::new(1, 0));

        let second = first.step_towards(target);
        assert_eq!(second, TilePos::new(2, 0));

        let third = second.step_towards(target);
        assert_eq!(third, TilePos::new(2, -1));

        // Already there
        assert_eq!(third.step_towards(target), target);
    }
}
