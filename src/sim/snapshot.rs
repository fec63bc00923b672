//! Plain-data ship snapshots for save/replay hosts

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyKind};
use super::ship::Ship;
use super::team::TeamId;
use super::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    /// Always "Ship"
    pub kind: String,
    pub ship_type: String,
    pub pos: DVec2,
    pub vel: DVec2,
    pub team: Option<TeamId>,
    pub rotation: f64,
}

impl ShipSnapshot {
    pub fn of(body: &Body) -> Option<Self> {
        let ship = body.as_ship()?;
        Some(Self {
            kind: "Ship".to_string(),
            ship_type: ship.ship_type.clone(),
            pos: body.pos,
            vel: body.vel,
            team: body.team,
            rotation: body.rotation,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl World {
    /// Snapshots of every live ship, in id order
    pub fn snapshot_ships(&self) -> Vec<ShipSnapshot> {
        self.ships().filter_map(ShipSnapshot::of).collect()
    }

    /// Spawn a ship from a snapshot using the world's current tuning
    pub fn restore_ship(&mut self, snapshot: &ShipSnapshot) -> BodyId {
        let id = self.next_body_id();
        let ship = Ship::from_tuning(&snapshot.ship_type, &self.ship_tuning);
        let mut body = Body::new(id, BodyKind::Ship(ship))
            .with_pos(snapshot.pos)
            .with_vel(snapshot.vel)
            .with_rotation(snapshot.rotation);
        body.team = snapshot.team;
        body.collision_damping = self.collision_damping;
        self.add_ship(body)
    }
}
