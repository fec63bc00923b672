//! Arena Sim - circular rigid bodies, impulse collisions and steering AI
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collisions, AI, frame driver)
//! - `renderer`: Read-only draw interface (health bars, rings, waypoints)
//! - `audio`: Audio handle interface driven by thrust transitions
//! - `settings`: Data-driven simulation configuration

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::SimConfig;

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    use std::f64::consts::PI;

    /// Frame length the dx unit is normalized against (dx = 1 at 60 Hz)
    pub const FRAME_DT: f64 = 1.0 / 60.0;

    /// Default map extent
    pub const MAP_WIDTH: f64 = 2000.0;
    pub const MAP_HEIGHT: f64 = 1500.0;

    /// Body defaults
    pub const DEFAULT_RADIUS: f64 = 16.0;
    pub const DEFAULT_DENSITY: f64 = 0.02;
    pub const DEFAULT_COLLISION_DAMPING: f64 = 0.40;
    pub const DEFAULT_ROTATION: f64 = PI / 2.0;
    /// Floor for health-scaled mass so impulse math never divides by zero
    pub const MIN_MASS: f64 = 1e-6;

    /// Ship defaults
    pub const SHIP_RADIUS: f64 = 16.0;
    pub const SHIP_ROTATION_SPEED: f64 = PI * 0.03;
    pub const SHIP_THRUST_AMT: f64 = 0.1;
    pub const SHIP_BOUNTY: u32 = 5;
    pub const SHIP_SENSOR_RANGE: f64 = 400.0;
    /// Speed² below which velocity snaps to exactly zero
    pub const MINIMUM_VELOCITY_SQRD: f64 = 0.001 * 0.001;
    /// Speed² below which a braking ship snaps to zero (raised to 2·thrust² for strong thrusters)
    pub const MIN_BRAKE_VEL: f64 = 0.2;

    /// Gun defaults
    pub const GUN_COOLDOWN: f64 = 20.0;
    pub const BULLET_SPEED: f64 = 6.0;
    pub const BULLET_DAMAGE: f64 = 0.5;
    pub const BULLET_RADIUS: f64 = 2.0;
    pub const BULLET_TTL: f64 = 90.0;

    /// Shield defaults
    pub const SHIELD_RADIUS: f64 = 120.0;
    pub const SHIELD_DEFENSE: f64 = 20.0;
    pub const SHIELD_RECHARGE: f64 = 0.002;

    /// Portal defaults
    pub const PORTAL_RADIUS: f64 = 64.0;
    pub const PORTAL_EXIT_MIN_RADIUS: f64 = 10.0;

    /// AI tuning
    /// Angular error under which an engaging ship opens fire (18°)
    pub const SHOT_TOLERANCE: f64 = PI / 10.0;
    /// Angular error under which a PointCommand completes (9°)
    pub const POINT_TOLERANCE: f64 = PI / 20.0;
    /// Heading·target dot product above which MoveCommand thrusts (~8.1°)
    pub const MOVE_ALIGN_DOT: f64 = 0.99;
    /// Squared distance to the destination that counts as arrived
    pub const MOVE_ARRIVAL_DIST_SQRD: f64 = 40.0;
    /// Heading error under which decelerate starts thrusting
    pub const DECEL_ALIGN_TOLERANCE: f64 = 1e-3;
}

/// Smallest signed difference `left - right`, in (-π, π]
///
/// 359° - 1° is -2°, not 358°.
#[inline]
pub fn angle_subtract(left: f64, right: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut delta = left - right;
    if delta > PI {
        delta -= TAU;
    }
    if delta < -PI {
        delta += TAU;
    }
    delta
}

/// Unit vector pointing along `theta`
#[inline]
pub fn unit_vector(theta: f64) -> DVec2 {
    DVec2::new(theta.cos(), theta.sin())
}

/// Angle of a vector (atan2), 0 for the zero vector
#[inline]
pub fn vector_angle(v: DVec2) -> f64 {
    v.y.atan2(v.x)
}
