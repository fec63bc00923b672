//! Waypoint markers owned by steering commands
//!
//! A MoveCommand places one when it is queued and releases it when it
//! completes or is cancelled. The renderer shows a marker only while its
//! owning AI is selected.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ai::AiId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub owner: AiId,
    pub pos: DVec2,
}

#[derive(Debug, Clone, Default)]
pub struct Markers {
    markers: Vec<Marker>,
    next_id: u32,
}

impl Markers {
    pub fn place(&mut self, owner: AiId, pos: DVec2) -> MarkerId {
        let id = MarkerId(self.next_id);
        self.next_id += 1;
        self.markers.push(Marker { id, owner, pos });
        id
    }

    /// Returns false if the marker was already gone
    pub fn release(&mut self, id: MarkerId) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        self.markers.len() != before
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
