//! Shields: team-owned bubbles that absorb and deflect bullets

use super::body::{Body, BodyId};
use super::world::Bodies;
use crate::consts::*;
use crate::settings::ShieldTuning;

#[derive(Debug, Clone)]
pub struct Shield {
    /// Ship the shield follows and hands its collision impulses to
    pub anchor: Option<BodyId>,
    /// Health regained per dx unit
    pub health_recharge_amt: f64,
}

impl Default for Shield {
    fn default() -> Self {
        Self {
            anchor: None,
            health_recharge_amt: SHIELD_RECHARGE,
        }
    }
}

impl Shield {
    pub fn from_tuning(tuning: &ShieldTuning) -> Self {
        Self {
            anchor: None,
            health_recharge_amt: tuning.health_recharge_amt,
        }
    }
}

/// Mass shrinks with health but never reaches zero
pub(super) fn shield_mass(base: f64, health: f64) -> f64 {
    (base * health).max(MIN_MASS)
}

impl Body {
    pub(super) fn recharge_shield(&mut self, dx: f64) {
        let Some(shield) = self.as_shield() else {
            return;
        };
        let recharge = shield.health_recharge_amt;
        self.health = (self.health + dx * recharge).min(1.0);
    }

    /// Health a reflection of `bullet` would cost, if this shield can reflect it now
    pub fn reflect_cost(&self, bullet: &Body) -> Option<f64> {
        if !self.caps.reflect_bullets || self.as_shield().is_none() {
            return None;
        }
        let payload = bullet.as_bullet()?;
        if !payload.can_hit_shield {
            return None;
        }
        let cost = payload.damage_amount / self.defense;
        if self.health < cost {
            return None;
        }
        let added_radii = self.radius() + bullet.radius();
        if bullet.pos.distance_squared(self.pos) > added_radii * added_radii {
            return None;
        }
        Some(cost)
    }
}

/// Bounce `bullet` off `shield` and drain the shield.
///
/// Returns false (and changes nothing) when the shield cannot take the hit;
/// true means the bullet must not deal direct damage.
pub fn reflect(bodies: &mut Bodies, shield: BodyId, bullet: BodyId) -> bool {
    let cost = match (bodies.live(shield), bodies.live(bullet)) {
        (Some(s), Some(b)) => s.reflect_cost(b),
        _ => None,
    };
    let Some(cost) = cost else {
        return false;
    };

    bodies.collide(bullet, shield);
    if let Some(body) = bodies.get_mut(shield) {
        body.health = (body.health - cost).max(0.0);
    }
    if let Some(payload) = bodies.get_mut(bullet).and_then(Body::as_bullet_mut) {
        payload.deflected_by.push(shield);
    }
    true
}
