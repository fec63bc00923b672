//! Draw primitives for 2D bodies

use glam::{DVec2, Vec2};

use crate::sim::{AiId, ThrustAnimation};

pub const BAR_SIZE: Vec2 = Vec2::new(32.0, 4.0);
pub const TEAM_DOT_RADIUS: f32 = 4.0;

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const HEALTHY: [f32; 4] = [0.0, 0.58, 0.075, 1.0];
pub const WOUNDED: [f32; 4] = [0.886, 0.0, 0.012, 1.0];

/// Health above this draws green
const HEALTHY_ABOVE: f64 = 0.45;
/// Shields fade out below this much health
const SHIELD_FADE_BELOW: f64 = 0.3;

/// Filled bar with a 1px border around it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Top-left of the fill area
    pub origin: Vec2,
    pub size: Vec2,
    /// Fill fraction, 0..=1
    pub fraction: f32,
    pub fill: [f32; 4],
    pub border: [f32; 4],
}

impl Bar {
    /// Bar centred over a body of `radius` at `pos`
    pub fn above(pos: DVec2, radius: f64, fraction: f64, fill: [f32; 4], border: [f32; 4]) -> Self {
        let size = BAR_SIZE.as_dvec2();
        let mut start = (pos - size * 0.5).floor();
        start.y -= radius + size.y;
        Self {
            origin: start.as_vec2(),
            size: BAR_SIZE,
            fraction: fraction.clamp(0.0, 1.0) as f32,
            fill,
            border,
        }
    }

    /// Rectangle of the border, one pixel larger on every side
    pub fn border_rect(&self) -> (Vec2, Vec2) {
        (self.origin - Vec2::ONE, self.size + Vec2::splat(2.0))
    }

    pub fn fill_width(&self) -> f32 {
        self.size.x * self.fraction
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    HealthBar(Bar),
    /// 1px white outline at the body radius
    SelectionRing { center: Vec2, radius: f32 },
    ShieldRing { center: Vec2, radius: f32, color: [f32; 4] },
    ShieldBar(Bar),
    TeamDot { center: Vec2, color: [f32; 4] },
    ShipSprite {
        ship_type: String,
        pos: Vec2,
        rotation: f32,
        animation: ThrustAnimation,
    },
    Waypoint { pos: Vec2, owner: AiId },
}

pub fn health_color(health: f64) -> [f32; 4] {
    if health > HEALTHY_ABOVE { HEALTHY } else { WOUNDED }
}

pub fn health_bar(pos: DVec2, radius: f64, health: f64) -> Primitive {
    Primitive::HealthBar(Bar::above(pos, radius, health, health_color(health), WHITE))
}

/// Opacity of a shield outline
pub fn shield_alpha(health: f64) -> f32 {
    if health > SHIELD_FADE_BELOW {
        1.0
    } else {
        (health.max(0.0) / SHIELD_FADE_BELOW) as f32
    }
}

pub fn shield_ring(pos: DVec2, radius: f64, health: f64, team_color: [f32; 4]) -> Primitive {
    let mut color = team_color;
    color[3] *= shield_alpha(health);
    Primitive::ShieldRing {
        center: pos.as_vec2(),
        radius: radius as f32,
        color,
    }
}

pub fn shield_bar(pos: DVec2, radius: f64, health: f64, team_color: [f32; 4]) -> Primitive {
    Primitive::ShieldBar(Bar::above(pos, radius, health, team_color, BLACK))
}
