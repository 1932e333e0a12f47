//! Named map markers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{MarkerId, TilePos};

/// Marker id -> tile lookup for the current map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkerTable {
    markers: HashMap<MarkerId, TilePos>,
}

impl MarkerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place (or move) a marker.
    pub fn insert(&mut self, id: impl Into<MarkerId>, tile: TilePos) {
        self.markers.insert(id.into(), tile);
    }

    /// Look up a marker's tile.
    pub fn get(&self, id: &MarkerId) -> Option<TilePos> {
        self.markers.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl<K: Into<MarkerId>> FromIterator<(K, TilePos)> for MarkerTable {
    fn from_iter<I: IntoIterator<Item = (K, TilePos)>>(iter: I) -> Self {
        Self {
            markers: iter.into_iter().map(|(id, tile)| (id.into(), tile)).collect(),
        }
    }
}
