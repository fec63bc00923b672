//! Portals: stationary containers ships can enter and later leave
//!
//! Entering deletes the ship (its AI terminates on the `Deleted`
//! notification) and the lifecycle phase moves the body into the portal.
//! Sending ships out undeletes them and re-adds them with a fresh AI.

use std::f64::consts::TAU;

use rand::Rng;

use super::body::{Body, BodyId};
use super::events::WorldEvent;
use super::world::{Pending, World};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::unit_vector;

#[derive(Debug)]
pub struct Portal {
    pub require_flagship: bool,
    pub auto_activate: bool,
    pub ships_inside: Vec<Body>,
    /// Renderer sprite is live; dropped on delete and restored on undelete
    pub sprite_attached: bool,
}

impl Default for Portal {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Portal {
    pub fn new(require_flagship: bool, auto_activate: bool) -> Self {
        Self {
            require_flagship,
            auto_activate,
            ships_inside: Vec::new(),
            sprite_attached: true,
        }
    }

    pub fn is_flagship_inside(&self) -> bool {
        self.ships_inside
            .iter()
            .any(|b| b.as_ship().is_some_and(|s| s.is_flagship))
    }

    pub fn ship_ids(&self) -> Vec<BodyId> {
        self.ships_inside.iter().map(|b| b.id).collect()
    }
}

impl World {
    /// A ship reached the portal it was told to enter
    pub(super) fn enter_portal(&mut self, ship: BodyId, portal: BodyId) {
        self.audio.play(SoundEffect::EnterPortal);
        if let Some(body) = self.bodies.get_mut(ship) {
            body.delete(&mut self.outbox);
        }
        self.pending.push(Pending::Transfer { ship, portal });
        self.outbox.push_event(WorldEvent::ShipEnteredPortal { ship, portal });
        log::info!("Ship {:?} entered portal {:?}", ship, portal);
    }

    /// Move an entered ship body out of the arena and into the portal
    pub(super) fn transfer_into_portal(&mut self, ship: BodyId, portal: BodyId) {
        let Some(body) = self.bodies.remove(ship) else {
            return;
        };
        let auto_activate = match self.bodies.get_mut(portal).and_then(Body::as_portal_mut) {
            Some(p) => {
                p.ships_inside.push(body);
                p.auto_activate
            }
            None => {
                log::warn!("Portal {:?} vanished before ship {:?} arrived", portal, ship);
                return;
            }
        };
        if auto_activate {
            self.activate_portal(portal);
        }
    }

    /// Finish the level with the ships inside, if the flagship rule allows
    pub fn activate_portal(&mut self, portal: BodyId) -> bool {
        let Some(p) = self.bodies.live(portal).and_then(Body::as_portal) else {
            return false;
        };
        if p.require_flagship && !p.is_flagship_inside() {
            self.announce("Your Flagship must be inside the Portal to activate it.");
            return false;
        }
        let ships = p.ship_ids();
        log::info!("Portal {:?} activated with {} ships", portal, ships.len());
        self.outbox.push_event(WorldEvent::LevelFinished { ships });
        true
    }

    /// Release every contained ship around the portal. Returns how many left.
    pub fn send_ships_out(&mut self, portal: BodyId) -> usize {
        let Some(body) = self.bodies.get_mut(portal) else {
            return 0;
        };
        let (center, max_radius) = (body.pos, body.radius());
        let Some(p) = body.as_portal_mut() else {
            return 0;
        };
        let ships = std::mem::take(&mut p.ships_inside);
        if ships.is_empty() {
            self.announce("There are no ships inside the Portal.");
            return 0;
        }

        let count = ships.len();
        for mut ship in ships {
            let radians = self.rng.random_range(0.0..TAU);
            let radius = if max_radius > PORTAL_EXIT_MIN_RADIUS {
                self.rng.random_range(PORTAL_EXIT_MIN_RADIUS..max_radius)
            } else {
                PORTAL_EXIT_MIN_RADIUS
            };
            ship.pos = center + unit_vector(radians) * radius;
            ship.vel = glam::DVec2::ZERO;
            ship.undelete(self.audio.as_mut());
            if let Some(s) = ship.as_ship_mut() {
                // the old shield was torn down with the ship
                s.shield = None;
            }
            self.add_ship(ship);
        }
        log::info!("Portal {:?} sent out {} ships", portal, count);
        count
    }
}
