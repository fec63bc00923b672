//! Ships: controllable bodies with thrusters, a gun and an event channel

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyKind, EnterTarget, FireRequest, FrameContext, UpdateOutcome};
use super::events::{EventChannel, Outbox, ShipEvent};
use crate::audio::{AudioBackend, AudioHandle};
use crate::consts::*;
use crate::settings::ShipTuning;
use crate::unit_vector;

/// Sprite animation the renderer should show for the thrusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThrustAnimation {
    #[default]
    Still,
    Accel,
    Decel,
    BackwardsAccel,
    BackwardsDecel,
}

/// Forward-firing gun
#[derive(Debug, Clone)]
pub struct Gun {
    /// dx units between shots
    pub cooldown: f64,
    pub bullet_speed: f64,
    pub damage: f64,
    /// Bullet lifetime in dx units
    pub ttl: f64,
    pub explosion: String,
    reload: f64,
}

impl Default for Gun {
    fn default() -> Self {
        Self {
            cooldown: GUN_COOLDOWN,
            bullet_speed: BULLET_SPEED,
            damage: BULLET_DAMAGE,
            ttl: BULLET_TTL,
            explosion: "explosion".to_string(),
            reload: 0.0,
        }
    }
}

impl Gun {
    /// Count down the reload timer; true when a shot goes off
    fn trigger(&mut self, dx: f64, shooting: bool) -> bool {
        self.reload = (self.reload - dx).max(0.0);
        if shooting && self.reload <= 0.0 {
            self.reload = self.cooldown;
            return true;
        }
        false
    }
}

#[derive(Debug)]
pub struct Ship {
    /// Ship class name used in snapshots
    pub ship_type: String,
    pub group: Option<u32>,
    /// Position in the squad list (display only)
    pub rank_order: i32,
    pub bounty: u32,
    /// Radius of ability to detect ships
    pub sensor_range: f64,
    pub hostile: bool,
    pub is_flagship: bool,
    pub has_backward_thrusters: bool,
    pub rotation_speed: f64,
    pub thrust_amt: f64,
    thrust_input: f64,
    rotate_input: f64,
    /// Lets the ship snap to a stop at low speed
    brake_input: bool,
    /// Body the ship will enter once it touches it
    pub enter_input: Option<BodyId>,
    pub shoot_input: f64,
    pub gun: Option<Gun>,
    pub shield: Option<BodyId>,
    pub events: EventChannel,
    pub animation: ThrustAnimation,
    thrust_audio: Option<Box<dyn AudioHandle>>,
}

impl Default for Ship {
    fn default() -> Self {
        Self::new("Ship")
    }
}

impl Ship {
    pub fn new(ship_type: &str) -> Self {
        Self {
            ship_type: ship_type.to_string(),
            group: None,
            rank_order: 0,
            bounty: SHIP_BOUNTY,
            sensor_range: SHIP_SENSOR_RANGE,
            hostile: true,
            is_flagship: false,
            has_backward_thrusters: true,
            rotation_speed: SHIP_ROTATION_SPEED,
            thrust_amt: SHIP_THRUST_AMT,
            thrust_input: 0.0,
            rotate_input: 0.0,
            brake_input: false,
            enter_input: None,
            shoot_input: 0.0,
            gun: None,
            shield: None,
            events: EventChannel::default(),
            animation: ThrustAnimation::Still,
            thrust_audio: None,
        }
    }

    /// Ship built from configured tuning
    pub fn from_tuning(ship_type: &str, tuning: &ShipTuning) -> Self {
        let mut ship = Self::new(ship_type);
        ship.thrust_amt = tuning.thrust_amt;
        ship.rotation_speed = tuning.rotation_speed;
        ship.has_backward_thrusters = tuning.has_backward_thrusters;
        if tuning.armed {
            ship.gun = Some(Gun::default());
        }
        ship
    }

    pub fn thrust_input(&self) -> f64 {
        self.thrust_input
    }

    pub fn rotate_input(&self) -> f64 {
        self.rotate_input
    }

    pub fn brake_input(&self) -> bool {
        self.brake_input
    }

    /// Set thrust in [-1, 1] (negative only with backward thrusters).
    ///
    /// Out-of-range values are a caller bug and panic before anything changes.
    pub fn set_thrust_input(&mut self, value: f64, brake: bool) {
        assert!(value.abs() <= 1.0, "thrust input {value} out of range");
        assert!(
            value >= 0.0 || self.has_backward_thrusters,
            "negative thrust {value} without backward thrusters"
        );
        self.brake_input = brake;
        if self.thrust_input == value {
            return;
        }
        if value == 0.0 {
            if let Some(audio) = self.thrust_audio.as_mut() {
                audio.pause();
            }
            self.animation = if self.thrust_input > 0.0 {
                ThrustAnimation::Decel
            } else {
                ThrustAnimation::BackwardsDecel
            };
        } else {
            if let Some(audio) = self.thrust_audio.as_mut() {
                audio.play();
            }
            self.animation = if value > 0.0 {
                ThrustAnimation::Accel
            } else {
                ThrustAnimation::BackwardsAccel
            };
        }
        self.thrust_input = value;
    }

    /// Clamped to [-1, 1]
    pub fn set_rotate_input(&mut self, value: f64) {
        self.rotate_input = value.clamp(-1.0, 1.0);
    }

    pub fn clear_input(&mut self) {
        self.set_thrust_input(0.0, false);
        self.set_rotate_input(0.0);
        self.brake_input = false;
        self.enter_input = None;
    }

    pub fn has_resources(&self) -> bool {
        self.thrust_audio.is_some()
    }

    pub fn thrust_audio_playing(&self) -> bool {
        self.thrust_audio.as_ref().is_some_and(|a| a.is_playing())
    }

    pub fn init_resources(&mut self, audio: &mut dyn AudioBackend) {
        self.thrust_audio = Some(audio.thrust_loop());
    }

    fn release_resources(&mut self) {
        if let Some(mut audio) = self.thrust_audio.take() {
            audio.pause();
        }
    }

    /// Runs once when the owning body is deleted
    pub(super) fn tear_down(&mut self, id: BodyId, outbox: &mut Outbox) {
        self.events.emit(id, ShipEvent::Deleted, outbox);
        self.events.clear();
        self.clear_input();
        self.release_resources();
    }
}

impl Body {
    /// Steering integration; runs after the shared motion step
    pub(super) fn update_ship(&mut self, ctx: &FrameContext, enter: Option<EnterTarget>) -> UpdateOutcome {
        let radius = self.radius();
        let BodyKind::Ship(ship) = &mut self.kind else {
            return UpdateOutcome::Moved;
        };

        if let (Some(target), Some(entry)) = (ship.enter_input, enter) {
            let added_radii = radius + entry.radius;
            if entry.target == target && self.pos.distance_squared(entry.pos) < added_radii * added_radii {
                return UpdateOutcome::Entered(target);
            }
        }

        self.rotation = (self.rotation + ship.rotate_input * ship.rotation_speed * ctx.dx).rem_euclid(TAU);
        let heading = unit_vector(self.rotation);
        self.vel += heading * (ship.thrust_input * ship.thrust_amt * ctx.dx);

        // close enough to 0 is 0
        let speed_sqrd = self.vel.length_squared();
        let min_brake_vel = MIN_BRAKE_VEL.max(2.0 * ship.thrust_amt * ship.thrust_amt);
        if speed_sqrd < MINIMUM_VELOCITY_SQRD || (ship.brake_input && speed_sqrd < min_brake_vel) {
            self.vel = DVec2::ZERO;
        }

        let shooting = ship.shoot_input > 0.0;
        if let Some(gun) = ship.gun.as_mut() {
            if gun.trigger(ctx.dx, shooting) {
                return UpdateOutcome::Fired(FireRequest {
                    pos: self.pos + heading * (radius + BULLET_RADIUS + 1.0),
                    vel: self.vel + heading * gun.bullet_speed,
                    damage: gun.damage,
                    ttl: gun.ttl,
                    explosion: gun.explosion.clone(),
                });
            }
        }
        UpdateOutcome::Moved
    }

    /// Sprite transform mirrored for the renderer: (floored position, rotation)
    pub fn sprite_transform(&self) -> (DVec2, f64) {
        (self.pos.floor(), self.rotation + std::f64::consts::FRAC_PI_2)
    }
}
