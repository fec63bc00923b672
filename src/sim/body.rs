//! Physics bodies
//!
//! Every simulated object is a circle with position, velocity, rotation,
//! radius and density. Kind-specific state (ship controls, shield recharge,
//! portal contents, bullet payload) lives in `BodyKind`; collision and
//! targeting logic queries the `Capabilities` flags instead of the kind.

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::bullet::Bullet;
use super::events::{Outbox, ShipEvent, TargetAction, WorldEvent};
use super::portal::Portal;
use super::shield::{Shield, shield_mass};
use super::ship::Ship;
use super::team::TeamId;
use crate::audio::AudioBackend;
use crate::consts::*;

/// Stable body id, the only way to refer to another body
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Independent capability flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_be_shot: bool,
    pub reflect_bullets: bool,
    /// Can be knocked around by something that `can_cause_collision`
    pub can_be_struck: bool,
    pub can_cause_collision: bool,
    pub can_be_selected: bool,
    pub can_go_offscreen: bool,
}

/// Kind-specific state
#[derive(Debug)]
pub enum BodyKind {
    Ship(Ship),
    Shield(Shield),
    Portal(Portal),
    Bullet(Bullet),
}

/// Copyable discriminant of `BodyKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyTag {
    Ship,
    Shield,
    Portal,
    Bullet,
}

impl BodyKind {
    pub fn tag(&self) -> BodyTag {
        match self {
            BodyKind::Ship(_) => BodyTag::Ship,
            BodyKind::Shield(_) => BodyTag::Shield,
            BodyKind::Portal(_) => BodyTag::Portal,
            BodyKind::Bullet(_) => BodyTag::Bullet,
        }
    }

    /// Radius, capabilities and defense a fresh body of this kind starts with
    fn defaults(&self) -> (f64, Capabilities, f64) {
        match self {
            BodyKind::Ship(_) => (
                SHIP_RADIUS,
                Capabilities {
                    can_be_shot: true,
                    can_be_struck: true,
                    can_cause_collision: true,
                    can_be_selected: true,
                    ..Default::default()
                },
                1.0,
            ),
            BodyKind::Shield(_) => (
                SHIELD_RADIUS,
                Capabilities {
                    reflect_bullets: true,
                    can_go_offscreen: true,
                    ..Default::default()
                },
                SHIELD_DEFENSE,
            ),
            BodyKind::Portal(_) => (
                PORTAL_RADIUS,
                Capabilities {
                    can_be_selected: true,
                    ..Default::default()
                },
                1.0,
            ),
            BodyKind::Bullet(_) => (
                BULLET_RADIUS,
                Capabilities {
                    can_go_offscreen: true,
                    ..Default::default()
                },
                1.0,
            ),
        }
    }
}

/// Frame-wide values every body update sees
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Seconds since the previous frame
    pub dt: f64,
    /// Time-step-scaled displacement unit applied to velocity
    pub dx: f64,
    pub map_size: DVec2,
}

/// Where the body a ship wants to enter currently is
#[derive(Debug, Clone, Copy)]
pub struct EnterTarget {
    pub target: BodyId,
    pub pos: DVec2,
    pub radius: f64,
}

/// Bullet a ship's gun asked for this frame
#[derive(Debug, Clone)]
pub struct FireRequest {
    pub pos: DVec2,
    pub vel: DVec2,
    pub damage: f64,
    pub ttl: f64,
    pub explosion: String,
}

/// What happened during a body update
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    Moved,
    /// The ship reached its enter target and should move inside it
    Entered(BodyId),
    Fired(FireRequest),
    /// Bullet ran out of time or left the map
    Expired,
}

/// Result of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Kind ignores damage
    Ignored,
    Hit,
    Destroyed,
}

/// A simulated circular rigid body
#[derive(Debug)]
pub struct Body {
    pub id: BodyId,
    pub pos: DVec2,
    pub vel: DVec2,
    /// Radians, wrapped into [0, 2π) for ships
    pub rotation: f64,
    radius: f64,
    pub density: f64,
    /// Nominally 0..=1; callers clamp
    pub health: f64,
    pub defense: f64,
    /// Restitution used in collisions and wall bounces
    pub collision_damping: f64,
    /// Body that receives this body's collision impulses
    pub collision_target: BodyId,
    pub caps: Capabilities,
    pub team: Option<TeamId>,
    pub selected: bool,
    deleted: bool,
    pub kind: BodyKind,
}

impl Body {
    pub fn new(id: BodyId, kind: BodyKind) -> Self {
        let (radius, caps, defense) = kind.defaults();
        Self {
            id,
            pos: DVec2::ZERO,
            vel: DVec2::ZERO,
            rotation: DEFAULT_ROTATION,
            radius,
            density: DEFAULT_DENSITY,
            health: 1.0,
            defense,
            collision_damping: DEFAULT_COLLISION_DAMPING,
            collision_target: id,
            caps,
            team: None,
            selected: false,
            deleted: false,
            kind,
        }
    }

    pub fn with_pos(mut self, pos: DVec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_vel(mut self, vel: DVec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_team(mut self, team: TeamId) -> Self {
        self.team = Some(team);
        self
    }

    /// Radius is fixed once the body is built
    pub fn with_radius(mut self, radius: f64) -> Self {
        assert!(radius > 0.0, "radius must be positive, got {radius}");
        self.radius = radius;
        self
    }

    pub fn with_health(mut self, health: f64) -> Self {
        self.health = health;
        self
    }

    pub fn with_collision_target(mut self, target: BodyId) -> Self {
        self.collision_target = target;
        self
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn tag(&self) -> BodyTag {
        self.kind.tag()
    }

    pub fn name(&self) -> &'static str {
        match self.tag() {
            BodyTag::Ship => "Ship",
            BodyTag::Shield => "Shield",
            BodyTag::Portal => "Portal",
            BodyTag::Bullet => "Bullet",
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn as_ship(&self) -> Option<&Ship> {
        match &self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_ship_mut(&mut self) -> Option<&mut Ship> {
        match &mut self.kind {
            BodyKind::Ship(ship) => Some(ship),
            _ => None,
        }
    }

    pub fn as_shield(&self) -> Option<&Shield> {
        match &self.kind {
            BodyKind::Shield(shield) => Some(shield),
            _ => None,
        }
    }

    pub fn as_portal(&self) -> Option<&Portal> {
        match &self.kind {
            BodyKind::Portal(portal) => Some(portal),
            _ => None,
        }
    }

    pub fn as_portal_mut(&mut self) -> Option<&mut Portal> {
        match &mut self.kind {
            BodyKind::Portal(portal) => Some(portal),
            _ => None,
        }
    }

    pub fn as_bullet(&self) -> Option<&Bullet> {
        match &self.kind {
            BodyKind::Bullet(bullet) => Some(bullet),
            _ => None,
        }
    }

    pub fn as_bullet_mut(&mut self) -> Option<&mut Bullet> {
        match &mut self.kind {
            BodyKind::Bullet(bullet) => Some(bullet),
            _ => None,
        }
    }

    /// Whether a ship may enter this body
    pub fn can_be_entered(&self) -> bool {
        matches!(self.kind, BodyKind::Portal(_))
    }

    /// density · π · r², scaled by health for shields
    pub fn mass(&self) -> f64 {
        let base = self.density * PI * self.radius * self.radius;
        match self.kind {
            BodyKind::Shield(_) => shield_mass(base, self.health),
            _ => base,
        }
    }

    /// Circles touch or overlap
    pub fn overlaps(&self, other: &Body) -> bool {
        let added_radii = self.radius + other.radius;
        self.pos.distance_squared(other.pos) <= added_radii * added_radii
    }

    /// Advance one frame
    ///
    /// Panics when called on a deleted body: the frame driver must never
    /// update something it already tore down.
    pub fn update(&mut self, ctx: &FrameContext, enter: Option<EnterTarget>) -> UpdateOutcome {
        assert!(
            !self.deleted,
            "update called on deleted {} {:?}",
            self.name(),
            self.id
        );
        // portals never move
        if self.tag() == BodyTag::Portal {
            return UpdateOutcome::Moved;
        }

        self.pos += self.vel * ctx.dx;
        if !self.caps.can_go_offscreen {
            self.check_out_of_bounds(ctx.map_size);
        }

        match self.tag() {
            BodyTag::Ship => self.update_ship(ctx, enter),
            BodyTag::Shield => {
                self.recharge_shield(ctx.dx);
                UpdateOutcome::Moved
            }
            BodyTag::Bullet => self.age_bullet(ctx),
            BodyTag::Portal => UpdateOutcome::Moved,
        }
    }

    /// Clamp inside the map, reflecting velocity inward with damping.
    /// Axes are checked independently so a corner clamps both.
    pub fn check_out_of_bounds(&mut self, map_size: DVec2) {
        let r = self.radius;
        let damping = self.collision_damping;
        if self.pos.x - r < 0.0 {
            self.pos.x = r;
            self.vel.x = self.vel.x.abs() * damping;
        }
        if self.pos.y - r < 0.0 {
            self.pos.y = r;
            self.vel.y = self.vel.y.abs() * damping;
        }
        if self.pos.x + r >= map_size.x {
            self.pos.x = map_size.x - r;
            self.vel.x = -self.vel.x.abs() * damping;
        }
        if self.pos.y + r >= map_size.y {
            self.pos.y = map_size.y - r;
            self.vel.y = -self.vel.y.abs() * damping;
        }
    }

    /// Apply damage. Only ships take it; a ship at zero health requests an
    /// explosion, reports destruction and deletes itself.
    pub fn damage(&mut self, amount: f64, explosion: &str, outbox: &mut Outbox) -> DamageOutcome {
        if self.deleted {
            return DamageOutcome::Ignored;
        }
        let BodyKind::Ship(ship) = &self.kind else {
            return DamageOutcome::Ignored;
        };
        self.health -= amount / self.defense;
        ship.events.emit(self.id, ShipEvent::Hit, outbox);
        if self.health > 0.0 {
            return DamageOutcome::Hit;
        }

        outbox.push_event(WorldEvent::Explosion {
            pos: self.pos,
            vel: self.vel,
            animation: explosion.to_string(),
        });
        outbox.push_event(WorldEvent::ShipDestroyed {
            ship: self.id,
            bounty: ship.bounty,
        });
        ship.events.emit(self.id, ShipEvent::Destroyed, outbox);
        self.delete(outbox);
        DamageOutcome::Destroyed
    }

    /// Tell a ship someone has it in their sights
    pub fn on_targeted(&self, by: BodyId, action: TargetAction, outbox: &mut Outbox) {
        if let BodyKind::Ship(ship) = &self.kind {
            ship.events.emit(self.id, ShipEvent::Targeted { by, action }, outbox);
        }
    }

    /// Mark deleted and tear down. Returns false if already deleted.
    pub fn delete(&mut self, outbox: &mut Outbox) -> bool {
        if self.deleted {
            return false;
        }
        self.deleted = true;
        let id = self.id;
        match &mut self.kind {
            BodyKind::Ship(ship) => ship.tear_down(id, outbox),
            BodyKind::Portal(portal) => portal.sprite_attached = false,
            BodyKind::Shield(_) | BodyKind::Bullet(_) => {}
        }
        true
    }

    /// Bring a deleted body back (e.g. leaving a portal) with fresh resources
    pub fn undelete(&mut self, audio: &mut dyn AudioBackend) {
        self.deleted = false;
        match &mut self.kind {
            BodyKind::Ship(ship) => ship.init_resources(audio),
            BodyKind::Portal(portal) => portal.sprite_attached = true,
            BodyKind::Shield(_) | BodyKind::Bullet(_) => {}
        }
    }
}
